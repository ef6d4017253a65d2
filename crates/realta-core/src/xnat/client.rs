use super::{Experiment, FieldUpdate, FieldWriter, ScanSource};
use crate::config::XnatAlias;
use crate::error::Error;
use crate::scan::{normalize_image_type, Quality, ScanLocator, ScanRecord};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const MR_SESSION: &str = "xnat:mrSessionData";
const EXPERIMENT_COLUMNS: &str = "ID,label,project,subject_label";
const SCAN_COLUMNS: &str = "ID,xnat:mrscandata/id,xnat:mrscandata/type,\
xnat:mrscandata/series_description,xnat:mrscandata/quality,xnat:mrscandata/note,\
xnat:mrscandata/parameters/imagetype";

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(rename = "ResultSet")]
    result_set: ResultSet<T>,
}

#[derive(Deserialize)]
struct ResultSet<T> {
    #[serde(rename = "Result", default = "Vec::new")]
    result: Vec<T>,
}

#[derive(Deserialize)]
struct ScanRow {
    #[serde(rename = "xnat:mrscandata/id", default)]
    id: Option<String>,
    #[serde(rename = "xnat:mrscandata/type", default)]
    scan_type: Option<String>,
    #[serde(rename = "xnat:mrscandata/series_description", default)]
    series_description: Option<String>,
    #[serde(rename = "xnat:mrscandata/quality", default)]
    quality: Option<String>,
    #[serde(rename = "xnat:mrscandata/note", default)]
    note: Option<String>,
    #[serde(rename = "xnat:mrscandata/parameters/imagetype", default)]
    image_type: Option<String>,
}

impl ScanRow {
    fn into_record(self, experiment: &Experiment) -> Option<ScanRecord> {
        let id = non_empty(self.id)?;
        Some(ScanRecord {
            id,
            session_label: experiment.label.clone(),
            subject_label: experiment.subject_label.clone(),
            project: experiment.project.clone(),
            series_description: non_empty(self.series_description),
            scan_type: non_empty(self.scan_type),
            image_type: self.image_type.as_deref().and_then(normalize_image_type),
            quality: Quality::from_listing(self.quality.as_deref().unwrap_or_default()),
            note: self.note.unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Blocking REST client for one XNAT alias.
pub struct XnatClient {
    base_url: String,
    username: String,
    password: String,
    http: Client,
}

impl XnatClient {
    pub fn new(alias: &XnatAlias) -> Result<XnatClient, Error> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(XnatClient {
            base_url: alias.url.trim_end_matches('/').to_string(),
            username: alias.username.clone(),
            password: alias.password.clone(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<Vec<T>, Error> {
        let url = format!("{}/data/experiments", self.base_url);
        debug!("GET {} {:?}", url, params);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("format", "json"), ("xsiType", MR_SESSION)])
            .query(params)
            .send()?;
        let envelope: Envelope<T> = check_status(response, "GET", &url)?.json()?;
        Ok(envelope.result_set.result)
    }
}

fn check_status(response: Response, method: &str, url: &str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::ExternalCall {
            operation: format!("{} {}", method, url),
            status: status.as_u16(),
        })
    }
}

impl ScanSource for XnatClient {
    fn experiments(
        &self,
        label: Option<&str>,
        project: Option<&str>,
    ) -> Result<Vec<Experiment>, Error> {
        let mut params = vec![("columns", EXPERIMENT_COLUMNS)];
        if let Some(label) = label {
            params.push(("label", label));
        }
        if let Some(project) = project {
            params.push(("project", project));
        }
        self.search(&params)
    }

    fn scans(&self, experiment: &Experiment) -> Result<Vec<ScanRecord>, Error> {
        let rows: Vec<ScanRow> =
            self.search(&[("columns", SCAN_COLUMNS), ("ID", experiment.id.as_str())])?;
        let scans: Vec<ScanRecord> = rows
            .into_iter()
            .filter_map(|row| row.into_record(experiment))
            .collect();
        debug!("{} scans listed for {}", scans.len(), experiment.label);
        Ok(scans)
    }
}

impl FieldWriter for XnatClient {
    fn set_field(&self, target: &ScanLocator, update: &FieldUpdate) -> Result<(), Error> {
        let url = format!(
            "{}/data/projects/{}/subjects/{}/experiments/{}/scans/{}",
            self.base_url, target.project, target.subject, target.session, target.scan
        );
        let name = update.param_name();
        info!("PUT {} {}={}", url, name, update.param_value());
        let response = self
            .http
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[(name.as_str(), update.param_value())])
            .send()?;
        check_status(response, "PUT", &url)?;
        Ok(())
    }
}
