// SPDX-License-Identifier: Apache-2.0

//! EDF / EDF+ fixed header reader.
//!
//! Only the ASCII header is read: a 256-byte main block followed by 256 bytes
//! per signal, stored column-wise (all labels, then all transducers, ...).
//! Data records are never touched.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bids_sidecar_model::SourceMapping;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::{SourceError, SourceErrorCode};

pub const EDF_MAIN_HEADER_BYTES: usize = 256;
pub const EDF_SIGNAL_HEADER_BYTES: usize = 256;

const ANNOTATION_LABEL: &str = "EDF Annotations";
const MAX_SIGNALS: usize = 4096;

/// Keys of the flat header mapping, in emission order.
pub const EDF_HEADER_KEYS: [&str; 14] = [
    "sampling_frequency",
    "recording_duration",
    "recording_start_time",
    "number_of_channels",
    "channel_names",
    "channel_units",
    "digital_minimum",
    "digital_maximum",
    "physical_minimum",
    "physical_maximum",
    "prefiltering",
    "patient_info",
    "recording_info",
    "equipment_info",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalHeader {
    pub label: String,
    pub transducer: String,
    pub physical_dimension: String,
    pub physical_minimum: f64,
    pub physical_maximum: f64,
    pub digital_minimum: i64,
    pub digital_maximum: i64,
    pub prefiltering: String,
    pub samples_per_record: u64,
}

impl SignalHeader {
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.label == ANNOTATION_LABEL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdfHeader {
    pub version: String,
    pub patient_info: String,
    pub recording_info: String,
    pub start_date: String,
    pub start_time: String,
    pub header_bytes: u64,
    pub reserved: String,
    /// `-1` while a recording is still being written.
    pub data_records: i64,
    pub record_duration: f64,
    pub signals: Vec<SignalHeader>,
}

impl EdfHeader {
    #[must_use]
    pub fn is_edf_plus(&self) -> bool {
        self.reserved.starts_with("EDF+")
    }

    /// Signals excluding EDF+ annotation channels.
    pub fn data_signals(&self) -> impl Iterator<Item = &SignalHeader> + '_ {
        self.signals.iter().filter(|s| !s.is_annotation())
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.data_signals().count()
    }

    #[must_use]
    pub fn signal_frequency(&self, signal: &SignalHeader) -> Option<f64> {
        (self.record_duration > 0.0)
            .then(|| signal.samples_per_record as f64 / self.record_duration)
    }

    /// Frequency of the first data signal.
    #[must_use]
    pub fn sampling_frequency(&self) -> Option<f64> {
        self.data_signals()
            .next()
            .and_then(|s| self.signal_frequency(s))
    }

    /// Total duration in seconds; unknown while the record count is `-1`.
    #[must_use]
    pub fn recording_duration(&self) -> Option<f64> {
        (self.data_records >= 0 && self.record_duration >= 0.0)
            .then(|| self.data_records as f64 * self.record_duration)
    }

    /// ISO-8601 start time. Two-digit years follow the EDF clipping rule:
    /// 85..=99 are 19xx, everything else 20xx.
    #[must_use]
    pub fn start_time_iso(&self) -> Option<String> {
        let [dd, mm, yy] = split_triplet(&self.start_date)?;
        let [hh, mi, ss] = split_triplet(&self.start_time)?;
        if !(1..=31).contains(&dd) || !(1..=12).contains(&mm) || hh > 23 || mi > 59 || ss > 59 {
            return None;
        }
        let year = if yy >= 85 { 1900 + yy } else { 2000 + yy };
        Some(format!("{year:04}-{mm:02}-{dd:02}T{hh:02}:{mi:02}:{ss:02}"))
    }

    /// Equipment code from the EDF+ recording field
    /// (`Startdate <date> <admin code> <technician> <equipment>`).
    #[must_use]
    pub fn equipment(&self) -> Option<String> {
        if !self.is_edf_plus() {
            return None;
        }
        let mut parts = self.recording_info.split_whitespace();
        if parts.next() != Some("Startdate") {
            return None;
        }
        parts
            .nth(3)
            .filter(|e| *e != "X")
            .map(|e| e.replace('_', " "))
    }

    /// Flat mapping keyed by [`EDF_HEADER_KEYS`].
    #[must_use]
    pub fn to_mapping(&self) -> SourceMapping {
        let signals: Vec<&SignalHeader> = self.data_signals().collect();
        let mut map = Map::new();
        map.insert(
            "sampling_frequency".to_string(),
            opt_number(self.sampling_frequency()),
        );
        map.insert(
            "recording_duration".to_string(),
            opt_number(self.recording_duration()),
        );
        map.insert(
            "recording_start_time".to_string(),
            self.start_time_iso().map_or(Value::Null, Value::String),
        );
        map.insert(
            "number_of_channels".to_string(),
            Value::from(signals.len() as u64),
        );
        map.insert(
            "channel_names".to_string(),
            strings(signals.iter().map(|s| s.label.as_str())),
        );
        map.insert(
            "channel_units".to_string(),
            strings(signals.iter().map(|s| s.physical_dimension.as_str())),
        );
        map.insert(
            "digital_minimum".to_string(),
            Value::Array(signals.iter().map(|s| Value::from(s.digital_minimum)).collect()),
        );
        map.insert(
            "digital_maximum".to_string(),
            Value::Array(signals.iter().map(|s| Value::from(s.digital_maximum)).collect()),
        );
        map.insert(
            "physical_minimum".to_string(),
            Value::Array(signals.iter().map(|s| number(s.physical_minimum)).collect()),
        );
        map.insert(
            "physical_maximum".to_string(),
            Value::Array(signals.iter().map(|s| number(s.physical_maximum)).collect()),
        );
        map.insert(
            "prefiltering".to_string(),
            strings(signals.iter().map(|s| s.prefiltering.as_str())),
        );
        map.insert("patient_info".to_string(), non_empty(&self.patient_info));
        map.insert("recording_info".to_string(), non_empty(&self.recording_info));
        map.insert(
            "equipment_info".to_string(),
            self.equipment().map_or(Value::Null, Value::String),
        );
        SourceMapping::from(map)
    }
}

/// Per-channel view used for `channels.tsv`-style listings.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChannelInfo {
    pub channel_names: Vec<String>,
    pub channel_types: Vec<String>,
    pub sampling_frequencies: Vec<Value>,
    pub units: Vec<String>,
    pub low_cutoff: Vec<Value>,
    pub high_cutoff: Vec<Value>,
    pub reference: Vec<String>,
    pub status: Vec<String>,
}

#[must_use]
pub fn channel_info(header: &EdfHeader) -> ChannelInfo {
    let mut info = ChannelInfo::default();
    for signal in header.data_signals() {
        info.channel_names.push(signal.label.clone());
        info.channel_types
            .push(channel_type(&signal.label).to_string());
        info.sampling_frequencies
            .push(opt_number(header.signal_frequency(signal)));
        info.units.push(signal.physical_dimension.clone());
        info.low_cutoff
            .push(opt_number(filter_cutoff(&signal.prefiltering, "HP:")));
        info.high_cutoff
            .push(opt_number(filter_cutoff(&signal.prefiltering, "LP:")));
        info.reference.push(channel_reference(&signal.label));
        info.status.push("good".to_string());
    }
    info
}

fn channel_type(label: &str) -> &'static str {
    let upper = label.trim().to_ascii_uppercase();
    let kinds = [
        ("EEG", "EEG"),
        ("ECG", "ECG"),
        ("EKG", "ECG"),
        ("EMG", "EMG"),
        ("EOG", "EOG"),
        ("RESP", "RESP"),
        ("TRIG", "TRIG"),
    ];
    kinds
        .iter()
        .find(|(prefix, _)| upper.starts_with(prefix))
        .map_or("MISC", |(_, kind)| kind)
}

fn channel_reference(label: &str) -> String {
    label
        .rsplit_once('-')
        .map(|(_, r)| r.trim())
        .filter(|r| !r.is_empty())
        .map_or_else(|| "n/a".to_string(), ToString::to_string)
}

/// Parses `HP:0.1Hz LP:70Hz N:50Hz` style prefiltering text.
fn filter_cutoff(prefiltering: &str, tag: &str) -> Option<f64> {
    prefiltering.split_whitespace().find_map(|token| {
        let upper = token.to_ascii_uppercase();
        let rest = upper.strip_prefix(tag)?;
        let digits = rest.trim_end_matches("HZ");
        digits.parse::<f64>().ok()
    })
}

/// Components of `PRV-002-13UL-24.edf`: study, site, patient, session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFileName {
    pub study: String,
    pub site: String,
    pub patient_id: String,
    pub session: String,
}

#[must_use]
pub fn parse_recording_file_name(path: &Path) -> Option<RecordingFileName> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('-').collect();
    if parts.len() < 4 || parts.iter().any(|p| p.trim().is_empty()) {
        return None;
    }
    let n = parts.len();
    Some(RecordingFileName {
        study: parts[0].to_string(),
        site: parts[1..n - 2].join("-"),
        patient_id: parts[n - 2].to_string(),
        session: parts[n - 1].to_string(),
    })
}

/// Existence plus `.edf` extension check; the header itself is not opened.
#[must_use]
pub fn validate_recording_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("edf"))
}

pub fn read_edf_header(path: &Path) -> Result<EdfHeader, SourceError> {
    let mut file = File::open(path).map_err(|e| {
        SourceError::new(
            SourceErrorCode::Io,
            format!("open {} failed: {e}", path.display()),
        )
    })?;
    let mut bytes = vec![0u8; EDF_MAIN_HEADER_BYTES];
    file.read_exact(&mut bytes).map_err(|e| {
        SourceError::new(
            SourceErrorCode::Malformed,
            format!("{}: main header truncated: {e}", path.display()),
        )
    })?;
    let signal_count = parse_signal_count(&bytes)?;
    let mut signal_bytes = vec![0u8; signal_count * EDF_SIGNAL_HEADER_BYTES];
    file.read_exact(&mut signal_bytes).map_err(|e| {
        SourceError::new(
            SourceErrorCode::Malformed,
            format!("{}: signal headers truncated: {e}", path.display()),
        )
    })?;
    bytes.extend_from_slice(&signal_bytes);
    parse_edf_header(&bytes)
}

pub fn parse_edf_header(bytes: &[u8]) -> Result<EdfHeader, SourceError> {
    if bytes.len() < EDF_MAIN_HEADER_BYTES {
        return Err(malformed(format!(
            "header is {} bytes, expected at least {EDF_MAIN_HEADER_BYTES}",
            bytes.len()
        )));
    }
    let version = text(&bytes[0..8]);
    if version != "0" {
        return Err(SourceError::new(
            SourceErrorCode::Malformed,
            format!("unsupported EDF version field: {version:?}"),
        ));
    }
    let signal_count = parse_signal_count(bytes)?;
    let expected = EDF_MAIN_HEADER_BYTES + signal_count * EDF_SIGNAL_HEADER_BYTES;
    let header_bytes: u64 = number_field(&bytes[184..192], "header byte count")?;
    if header_bytes != expected as u64 {
        return Err(malformed(format!(
            "header byte count {header_bytes} does not match {signal_count} signals ({expected})"
        )));
    }
    if bytes.len() < expected {
        return Err(malformed(format!(
            "signal headers truncated: {} of {expected} bytes",
            bytes.len()
        )));
    }

    let sig = &bytes[EDF_MAIN_HEADER_BYTES..expected];
    let columns = SignalColumns {
        bytes: sig,
        count: signal_count,
    };
    let mut signals = Vec::with_capacity(signal_count);
    for i in 0..signal_count {
        signals.push(SignalHeader {
            label: text(columns.field(0, 16, i)),
            transducer: text(columns.field(16, 80, i)),
            physical_dimension: text(columns.field(96, 8, i)),
            physical_minimum: number_field(columns.field(104, 8, i), "physical minimum")?,
            physical_maximum: number_field(columns.field(112, 8, i), "physical maximum")?,
            digital_minimum: number_field(columns.field(120, 8, i), "digital minimum")?,
            digital_maximum: number_field(columns.field(128, 8, i), "digital maximum")?,
            prefiltering: text(columns.field(136, 80, i)),
            samples_per_record: number_field(columns.field(216, 8, i), "samples per record")?,
        });
    }

    Ok(EdfHeader {
        version,
        patient_info: text(&bytes[8..88]),
        recording_info: text(&bytes[88..168]),
        start_date: text(&bytes[168..176]),
        start_time: text(&bytes[176..184]),
        header_bytes,
        reserved: text(&bytes[192..236]),
        data_records: number_field(&bytes[236..244], "data record count")?,
        record_duration: number_field(&bytes[244..252], "data record duration")?,
        signals,
    })
}

/// Column-major view over the signal header block. Column offsets are given
/// per signal and scale with the signal count.
struct SignalColumns<'a> {
    bytes: &'a [u8],
    count: usize,
}

impl<'a> SignalColumns<'a> {
    fn field(&self, offset: usize, width: usize, index: usize) -> &'a [u8] {
        let start = offset * self.count + index * width;
        &self.bytes[start..start + width]
    }
}

fn parse_signal_count(bytes: &[u8]) -> Result<usize, SourceError> {
    let count: usize = number_field(&bytes[252..256], "signal count")?;
    if count > MAX_SIGNALS {
        return Err(malformed(format!(
            "signal count {count} exceeds {MAX_SIGNALS}"
        )));
    }
    Ok(count)
}

fn number_field<T: std::str::FromStr>(bytes: &[u8], what: &str) -> Result<T, SourceError> {
    let raw = text(bytes);
    raw.parse::<T>()
        .map_err(|_| malformed(format!("{what} is not a number: {raw:?}")))
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

fn malformed(message: String) -> SourceError {
    SourceError::new(SourceErrorCode::Malformed, message)
}

fn split_triplet(raw: &str) -> Option<[u32; 3]> {
    let mut it = raw.split('.').map(|p| p.parse::<u32>().ok());
    let out = [it.next()??, it.next()??, it.next()??];
    it.next().is_none().then_some(out)
}

/// Whole numbers are emitted as integers so `256.0 Hz` prints as `256`.
fn number(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

fn opt_number(value: Option<f64>) -> Value {
    value.map_or(Value::Null, number)
}

fn strings<'a>(items: impl Iterator<Item = &'a str>) -> Value {
    Value::Array(items.map(|s| Value::String(s.to_string())).collect())
}

fn non_empty(raw: &str) -> Value {
    if raw.is_empty() {
        Value::Null
    } else {
        Value::String(raw.to_string())
    }
}
