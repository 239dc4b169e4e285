// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
}

pub struct Signal {
    pub label: &'static str,
    pub samples_per_record: u32,
}

pub const TEN_TWENTY: [Signal; 3] = [
    Signal {
        label: "EEG Fp1-REF",
        samples_per_record: 256,
    },
    Signal {
        label: "EEG Fp2-REF",
        samples_per_record: 256,
    },
    Signal {
        label: "EDF Annotations",
        samples_per_record: 60,
    },
];

fn field(out: &mut Vec<u8>, value: &str, width: usize) {
    let padded = format!("{value:<width$}");
    assert_eq!(padded.len(), width, "fixture field too long: {value}");
    out.extend_from_slice(padded.as_bytes());
}

/// EDF+ header for a 300 s recording with one-second data records.
pub fn edf_header(signals: &[Signal]) -> Vec<u8> {
    let ns = signals.len();
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
    for s in signals {
        field(&mut out, s.label, 16);
    }
    for _ in signals {
        field(&mut out, "AgAgCl electrode", 80);
    }
    for _ in signals {
        field(&mut out, "uV", 8);
    }
    for _ in signals {
        field(&mut out, "-3200", 8);
    }
    for _ in signals {
        field(&mut out, "3200", 8);
    }
    for _ in signals {
        field(&mut out, "-32768", 8);
    }
    for _ in signals {
        field(&mut out, "32767", 8);
    }
    for _ in signals {
        field(&mut out, "HP:0.5Hz LP:70Hz", 80);
    }
    for s in signals {
        field(&mut out, &s.samples_per_record.to_string(), 8);
    }
    for _ in signals {
        field(&mut out, "", 32);
    }
    out
}

pub fn write_edf(dir: &Path, name: &str, signals: &[Signal]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, edf_header(signals)).expect("write edf fixture");
    path
}
