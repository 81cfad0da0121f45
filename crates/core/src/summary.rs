//! Admin analytics over live sessions and a sample of recent log records.
//!
//! Every figure derived from log records is a sample statistic over the
//! records passed in (at most [`SUMMARY_SAMPLE_SIZE`] in practice), not a
//! total since the log file was created. The report carries `sampleSize`
//! so API consumers can tell.
//!
//! [`SUMMARY_SAMPLE_SIZE`]: crate::limits::SUMMARY_SAMPLE_SIZE

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::limits::TOP_ENDPOINTS;
use crate::records::{LogEntry, LogRecord};
use crate::session::ActiveSession;

/// Breakdown of the live sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: usize,
    pub device_breakdown: BTreeMap<String, u64>,
    pub browser_breakdown: BTreeMap<String, u64>,
    pub country_breakdown: BTreeMap<String, u64>,
}

impl SessionStats {
    pub fn from_sessions(sessions: &[ActiveSession]) -> Self {
        let mut stats = Self {
            total_sessions: sessions.len(),
            ..Self::default()
        };

        for active in sessions {
            let session = &active.session;
            *stats
                .device_breakdown
                .entry(session.device.to_string())
                .or_default() += 1;
            *stats
                .browser_breakdown
                .entry(session.browser.to_string())
                .or_default() += 1;
            *stats
                .country_breakdown
                .entry(session.location.country.clone())
                .or_default() += 1;
        }

        stats
    }
}

/// One row of the popular endpoints ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCount {
    pub url: String,
    pub count: u64,
}

/// Summary statistics for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    #[serde(flatten)]
    pub sessions: SessionStats,
    /// Number of log lines the figures below were computed from
    pub sample_size: usize,
    pub total_requests: u64,
    #[serde(rename = "uniqueIPs")]
    pub unique_ips: usize,
    /// Mean response time in milliseconds, 0 when no responses were sampled
    pub average_response_time: f64,
    pub popular_endpoints: Vec<EndpointCount>,
    pub status_codes: BTreeMap<u16, u64>,
}

/// Summarize live sessions and a sample of log entries.
///
/// Placeholder and partial entries count toward `sampleSize` only.
pub fn summarize(sessions: &[ActiveSession], entries: &[LogEntry]) -> SummaryReport {
    let mut total_requests = 0u64;
    let mut ips: HashSet<&str> = HashSet::new();
    let mut response_count = 0u64;
    let mut response_time_sum = 0.0f64;
    let mut status_codes: BTreeMap<u16, u64> = BTreeMap::new();

    // Encounter order is kept so equal counts rank first-seen first.
    let mut endpoints: Vec<EndpointCount> = Vec::new();
    let mut endpoint_index: HashMap<&str, usize> = HashMap::new();

    for record in entries.iter().filter_map(LogEntry::record) {
        ips.insert(record.ip());

        match record {
            LogRecord::Request(request) => {
                total_requests += 1;
                match endpoint_index.get(request.url.as_str()) {
                    Some(&i) => endpoints[i].count += 1,
                    None => {
                        endpoint_index.insert(request.url.as_str(), endpoints.len());
                        endpoints.push(EndpointCount {
                            url: request.url.clone(),
                            count: 1,
                        });
                    }
                }
            }
            LogRecord::Response(response) => {
                response_count += 1;
                response_time_sum += response.response_time_ms().unwrap_or(0.0);
                *status_codes.entry(response.status_code).or_default() += 1;
            }
            LogRecord::NewSession(_) => {}
        }
    }

    // sort_by is stable
    endpoints.sort_by(|a, b| b.count.cmp(&a.count));
    endpoints.truncate(TOP_ENDPOINTS);

    let average_response_time = if response_count == 0 {
        0.0
    } else {
        response_time_sum / response_count as f64
    };

    SummaryReport {
        sessions: SessionStats::from_sessions(sessions),
        sample_size: entries.len(),
        total_requests,
        unique_ips: ips.len(),
        average_response_time,
        popular_endpoints: endpoints,
        status_codes,
    }
}
