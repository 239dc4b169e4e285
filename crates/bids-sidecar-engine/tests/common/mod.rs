// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use bids_sidecar_config::{load_config_set, SidecarConfigSet};

pub fn workspace_config() -> SidecarConfigSet {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config");
    load_config_set(&dir).expect("workspace config")
}

fn field(out: &mut Vec<u8>, value: &str, width: usize) {
    out.extend_from_slice(format!("{value:<width$}").as_bytes());
}

/// Two 256 Hz EEG channels plus an annotation channel, 300 one-second records.
pub fn write_edf(dir: &Path, name: &str) -> PathBuf {
    let labels = ["EEG Fp1-REF", "EEG Fp2-REF", "EDF Annotations"];
    let samples = ["256", "256", "60"];
    let ns = labels.len();
    let mut out = Vec::new();
    field(&mut out, "0", 8);
    field(&mut out, "13UL F 02-AUG-2000 X", 80);
    field(&mut out, "Startdate 14-MAR-2024 X X Natus_XLTEK", 80);
    field(&mut out, "14.03.24", 8);
    field(&mut out, "09.30.05", 8);
    field(&mut out, &(256 + ns * 256).to_string(), 8);
    field(&mut out, "EDF+C", 44);
    field(&mut out, "300", 8);
    field(&mut out, "1", 8);
    field(&mut out, &ns.to_string(), 4);
    for label in labels {
        field(&mut out, label, 16);
    }
    for (width, value) in [
        (80, "AgAgCl electrode"),
        (8, "uV"),
        (8, "-3200"),
        (8, "3200"),
        (8, "-32768"),
        (8, "32767"),
        (80, "HP:0.5Hz LP:70Hz"),
    ] {
        for _ in 0..ns {
            field(&mut out, value, width);
        }
    }
    for s in samples {
        field(&mut out, s, 8);
    }
    for _ in 0..ns {
        field(&mut out, "", 32);
    }
    let path = dir.join(name);
    std::fs::write(&path, out).expect("write edf fixture");
    path
}

pub fn write_form(dir: &Path, patient_id: &str, yaml: &str) {
    std::fs::write(dir.join(format!("{patient_id}.yaml")), yaml).expect("write form fixture");
}

pub const FORM_13UL: &str = "\
demographics:
  age: 24
  sex: F
  handedness: R
recording_parameters:
  institution: Provincial Neurology Clinic
  equipment_manufacturer: Natus
  sampling_rate: 500
study_info:
  visit_date: \"2024-03-14\"
  visit_type: baseline
";
