//! Node set export: Primavera P6 CSV and JSON

use csv::{QuoteStyle, WriterBuilder};
use miette::Diagnostic;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::entities::WbsNode;

/// P6 import header, written unquoted
pub const P6_HEADER: &str = "wbs_code,parent_wbs_code,wbs_name";

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    #[diagnostic(code(wbsgen::export::csv))]
    Csv(String),

    #[error("serialization error: {0}")]
    #[diagnostic(code(wbsgen::export::serialize))]
    Serialize(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(wbsgen::export::io))]
    IoError(String),
}

/// Write nodes in P6 CSV form: plain header, every value double-quoted,
/// empty parent for the root
pub fn write_p6_csv<W: Write>(mut out: W, nodes: &[WbsNode]) -> Result<(), ExportError> {
    writeln!(out, "{}", P6_HEADER).map_err(|e| ExportError::IoError(e.to_string()))?;

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .from_writer(out);
    for node in nodes {
        writer
            .write_record([
                node.wbs_code.to_string(),
                node.parent_code_str(),
                node.wbs_name.clone(),
            ])
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }
    writer.flush().map_err(|e| ExportError::IoError(e.to_string()))
}

pub fn p6_csv_string(nodes: &[WbsNode]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_p6_csv(&mut buf, nodes)?;
    String::from_utf8(buf).map_err(|e| ExportError::Csv(e.to_string()))
}

/// Write nodes as a pretty-printed JSON array
pub fn write_json<W: Write>(mut out: W, nodes: &[WbsNode]) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut out, nodes)
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    writeln!(out).map_err(|e| ExportError::IoError(e.to_string()))
}

/// Write an export to a file, creating parent directories
pub fn write_to_file<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut std::io::BufWriter<std::fs::File>) -> Result<(), ExportError>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::IoError(e.to_string()))?;
    }
    let file = std::fs::File::create(path).map_err(|e| ExportError::IoError(e.to_string()))?;
    let mut out = std::io::BufWriter::new(file);
    write(&mut out)?;
    out.flush().map_err(|e| ExportError::IoError(e.to_string()))?;
    tracing::info!(path = %path.display(), "wrote export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::generate_new;
    use crate::entities::{Commissioning, EquipmentRecord};
    use tempfile::tempdir;

    fn example_nodes() -> Vec<WbsNode> {
        let records = vec![
            EquipmentRecord::new("+UH101", "Switchroom +Z01", "Panel A", Commissioning::Yes),
            EquipmentRecord::new("+UH101-F1", "Switchroom +Z01", "Relay", Commissioning::Yes)
                .with_parent("+UH101"),
            EquipmentRecord::new("E101", "Switchroom +Z01", "Earth rod", Commissioning::Yes),
        ];
        generate_new(&records, "Demo").unwrap().nodes
    }

    #[test]
    fn test_p6_csv_example() {
        let csv = p6_csv_string(&example_nodes()).unwrap();
        insta::assert_snapshot!(csv.trim_end(), @r###"
        wbs_code,parent_wbs_code,wbs_name
        "1","","Demo"
        "1.1","1","M | Milestones"
        "1.2","1","P | Pre-requisites"
        "1.2.1","1.2","S1 | +Z01 - Switchroom"
        "1.3","1","S1 | +Z01 - Switchroom"
        "1.3.1","1.3","01 | Preparations and set-up"
        "1.3.1.1","1.3.1","Test bay"
        "1.3.1.2","1.3.1","Panel Shop"
        "1.3.1.3","1.3.1","Pad"
        "1.3.2","1.3","02 | Protection Panels"
        "1.3.2.1","1.3.2","+UH101 | Panel A"
        "1.3.2.1.1","1.3.2.1","+UH101-F1 | Relay"
        "1.3.3","1.3","03 | HV Switchboards"
        "1.3.4","1.3","04 | LV Switchboards"
        "1.3.5","1.3","05 | Transformers"
        "1.3.6","1.3","06 | Battery Systems"
        "1.3.7","1.3","07 | Earthing"
        "1.3.7.1","1.3.7","E101 | Earth rod"
        "1.3.8","1.3","08 | Building Services"
        "1.3.9","1.3","09 | Interface Testing"
        "1.3.9.1","1.3.9","Phase 1"
        "1.3.9.2","1.3.9","Phase 2"
        "1.3.10","1.3","10 | Ancillary Systems"
        "1.3.11","1.3","99 | Unrecognised Equipment"
        "###);
    }

    #[test]
    fn test_p6_csv_escapes_quotes() {
        let node = WbsNode::new(crate::entities::WbsCode::root(), "Yard \"North\"");
        let csv = p6_csv_string(&[node]).unwrap();
        assert_eq!(
            csv,
            "wbs_code,parent_wbs_code,wbs_name\n\"1\",\"\",\"Yard \"\"North\"\"\"\n"
        );
    }

    #[test]
    fn test_json_export_uses_camel_case() {
        let mut buf = Vec::new();
        write_json(&mut buf, &example_nodes()[..2]).unwrap();
        let json = String::from_utf8(buf).unwrap();
        assert!(json.contains("\"wbsCode\": \"1.1\""));
        assert!(json.contains("\"parentWbsCode\": null"));
        assert!(!json.contains("isNew"));
    }

    #[test]
    fn test_write_to_file_creates_dirs() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("exports/p6.csv");
        let nodes = example_nodes();
        write_to_file(&path, |out| write_p6_csv(out, &nodes)).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(P6_HEADER));
        assert_eq!(contents.lines().count(), nodes.len() + 1);
    }
}
