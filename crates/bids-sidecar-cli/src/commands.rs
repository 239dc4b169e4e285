// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use bids_sidecar_config::{
    load_config_set, mapping_config_path, structure_config_path, SidecarConfigSet,
};
use bids_sidecar_core::resolve_config_dir;
use bids_sidecar_engine::{
    generate_sidecar, render_document, validate, write_document, GenerationRequest,
    GenerationResult, SourceBinding,
};
use bids_sidecar_model::SidecarDocument;
use bids_sidecar_sources::{
    channel_info, parse_recording_file_name, read_edf_header, validate_recording_file,
    CaseReportFormSource, EdfHeaderSource, FormView, SourceAdapter, SourceError,
    SourceErrorCode,
};
use serde::Serialize;
use serde_json::json;

use crate::{CliError, OutputMode};

pub(crate) struct GenerateArgs {
    pub config_dir: Option<PathBuf>,
    pub sidecar: String,
    pub edf: Option<PathBuf>,
    pub patient_id: Option<String>,
    pub session_age: Option<String>,
    pub output: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub forms_dir: Option<PathBuf>,
    pub fail_on_missing: bool,
    pub no_cache: bool,
}

fn load_config(config_dir: Option<&Path>) -> Result<SidecarConfigSet, CliError> {
    let dir = resolve_config_dir(config_dir);
    load_config_set(&dir).map_err(|e| {
        let mut err = CliError::validation("configuration_error", &e.0);
        err.machine = err
            .machine
            .with_detail("config_dir", &dir.display().to_string());
        err
    })
}

fn source_error(err: &SourceError) -> CliError {
    match err.code {
        SourceErrorCode::InvalidKey => CliError::usage(&err.message),
        SourceErrorCode::Malformed => CliError::validation("malformed_source", &err.message),
        _ => CliError::dependency(err.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T, output: OutputMode) -> Result<(), CliError> {
    let text = if output.json {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .map_err(|e| CliError::internal(e.to_string()))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn generate(args: GenerateArgs, output: OutputMode) -> Result<(), CliError> {
    let config = load_config(args.config_dir.as_deref())?;

    let from_name = args.edf.as_deref().and_then(parse_recording_file_name);
    let patient_id = args
        .patient_id
        .or_else(|| from_name.as_ref().map(|n| n.patient_id.clone()))
        .ok_or_else(|| {
            CliError::usage("--patient-id is required when the EDF file name does not carry it")
        })?;
    let session = args.session_age.or_else(|| from_name.map(|n| n.session));

    if let Some(edf) = &args.edf {
        if !validate_recording_file(edf) {
            tracing::warn!(path = %edf.display(), "recording is missing or not an .edf file");
        }
    }

    let header = EdfHeaderSource::with_cache(!args.no_cache);
    let mut forms = CaseReportFormSource::new(args.forms_dir);
    if args.no_cache {
        forms = forms.without_cache();
    }
    let edf_key = args.edf.as_ref().map(|p| p.to_string_lossy().into_owned());
    let mut bindings = Vec::new();
    if let Some(key) = edf_key.as_deref() {
        bindings.push(SourceBinding::new(&header, key));
    }
    bindings.push(SourceBinding::new(&forms, &patient_id));

    let request = GenerationRequest::new(&args.sidecar, &patient_id, session.as_deref());
    let result = generate_sidecar(&config, &request, &bindings)
        .map_err(|e| CliError::validation("generation_error", &e.0))?;

    let destination = match (args.output, args.output_dir) {
        (Some(path), _) => Some(path),
        (None, Some(dir)) => Some(dir.join(&result.file_name)),
        (None, None) => None,
    };
    match &destination {
        Some(path) => {
            write_document(path, &result.document).map_err(|e| CliError::dependency(e.0))?;
            report_generation(&result, path, output)?;
        }
        None if output.json => print_json(&result, output)?,
        None => {
            let bytes = render_document(&result.document).map_err(|e| CliError::internal(e.0))?;
            print!("{}", String::from_utf8_lossy(&bytes));
        }
    }

    if args.fail_on_missing && !result.report.is_complete() {
        return Err(CliError::validation(
            "missing_required_fields",
            &format!(
                "required fields missing: {}",
                result.report.missing_fields.join(", ")
            ),
        ));
    }
    Ok(())
}

fn report_generation(
    result: &GenerationResult,
    path: &Path,
    output: OutputMode,
) -> Result<(), CliError> {
    if output.json {
        return print_json(
            &json!({
                "sidecar": result.sidecar,
                "path": path.display().to_string(),
                "document_sha256": result.document_sha256,
                "plan_sha256": result.plan_sha256,
                "missing_fields": result.report.missing_fields,
                "notes": result.notes,
                "provenance": result.provenance,
            }),
            output,
        );
    }
    if output.quiet {
        return Ok(());
    }
    println!("{} sidecar written: {}", result.sidecar, path.display());
    for note in &result.notes {
        println!("  note: {note}");
    }
    if result.report.is_complete() {
        println!("  all required fields present");
    } else {
        println!(
            "  missing required fields: {}",
            result.report.missing_fields.join(", ")
        );
    }
    Ok(())
}

pub(crate) fn validate_document(
    config_dir: Option<PathBuf>,
    sidecar: &str,
    document_path: &Path,
    output: OutputMode,
) -> Result<(), CliError> {
    let config = load_config(config_dir.as_deref())?;
    let plan = config
        .plan(sidecar)
        .map_err(|e| CliError::validation("configuration_error", &e.0))?;
    let raw = fs::read(document_path).map_err(|e| {
        CliError::dependency(format!("read {} failed: {e}", document_path.display()))
    })?;
    let document: SidecarDocument = serde_json::from_slice(&raw).map_err(|e| {
        CliError::validation(
            "invalid_document",
            &format!("{} is not a JSON object: {e}", document_path.display()),
        )
    })?;
    let report = validate(&document, plan.required_fields);
    if output.json {
        print_json(&report, output)?;
    } else if !output.quiet && report.is_complete() {
        println!("{}: all required fields present", document_path.display());
    }
    if report.is_complete() {
        Ok(())
    } else {
        Err(CliError::validation(
            "missing_required_fields",
            &format!(
                "required fields missing: {}",
                report.missing_fields.join(", ")
            ),
        ))
    }
}

pub(crate) fn inspect_edf(path: &Path, channels: bool, output: OutputMode) -> Result<(), CliError> {
    let header = read_edf_header(path).map_err(|e| source_error(&e))?;
    if channels {
        print_json(&channel_info(&header), output)
    } else {
        print_json(&header.to_mapping(), output)
    }
}

pub(crate) fn inspect_form(
    patient_id: &str,
    forms_dir: Option<PathBuf>,
    view: Option<FormView>,
    output: OutputMode,
) -> Result<(), CliError> {
    let source = CaseReportFormSource::new(forms_dir);
    let mapping = match view {
        Some(view) => source.view(patient_id, view),
        None => source.get(patient_id),
    }
    .map_err(|e| source_error(&e))?;
    print_json(&mapping, output)
}

pub(crate) fn print_config_paths(
    config_dir: Option<PathBuf>,
    output: OutputMode,
) -> Result<(), CliError> {
    let dir = resolve_config_dir(config_dir.as_deref());
    print_json(
        &json!({
            "config_dir": dir.display().to_string(),
            "structure_config": structure_config_path(&dir).display().to_string(),
            "mapping_config": mapping_config_path(&dir).display().to_string(),
        }),
        output,
    )
}
