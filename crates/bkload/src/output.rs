use std::io::IsTerminal;

use bkload::catalog::{Barcode, CommandDef, Measure, Version};
use bkload::frame::{to_hex, Field, FieldKind};
use bkload::transport::PortInfo;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn hex_id(id: u8) -> String {
    format!("0x{id:02X}")
}

#[derive(Serialize)]
pub struct FieldValue {
    pub name: &'static str,
    pub value: String,
}

/// One frame, described by its catalog entry.
#[derive(Serialize)]
pub struct FrameReport {
    pub command: &'static str,
    pub id: String,
    pub direction: &'static str,
    pub address: u8,
    pub bytes: String,
    pub fields: Vec<FieldValue>,
}

impl FrameReport {
    pub fn new(
        def: &CommandDef,
        direction: &'static str,
        bytes: &[u8],
        fields: Vec<(&'static str, String)>,
    ) -> Self {
        Self {
            command: def.name,
            id: hex_id(bytes[2]),
            direction,
            address: bytes[1],
            bytes: to_hex(bytes),
            fields: fields
                .into_iter()
                .map(|(name, value)| FieldValue { name, value })
                .collect(),
        }
    }
}

pub fn print_frame(report: &FrameReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            println!(
                "{} ({} {}, address {})",
                report.command, report.direction, report.id, report.address
            );
            if !report.fields.is_empty() {
                let mut table = table(vec!["FIELD", "VALUE"]);
                for field in &report.fields {
                    table.add_row(vec![field.name, field.value.as_str()]);
                }
                println!("{table}");
            }
            println!("{}", report.bytes);
        }
        OutputFormat::Pretty => {
            println!("{}", report.bytes);
            let fields = report
                .fields
                .iter()
                .map(|f| format!(" {}={}", f.name, f.value))
                .collect::<String>();
            println!(
                "{} id={} address={}{}",
                report.command, report.id, report.address, fields
            );
        }
    }
}

pub fn print_measure(measure: &Measure, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(measure),
        OutputFormat::Table => {
            let mut table = table(vec!["QUANTITY", "VALUE"]);
            table
                .add_row(vec!["Voltage".to_string(), format!("{:.3} V", measure.volts)])
                .add_row(vec!["Current".to_string(), format!("{:.4} A", measure.amps)])
                .add_row(vec!["Power".to_string(), format!("{:.3} W", measure.watts)])
                .add_row(vec!["Operation".to_string(), measure.operation.to_string()])
                .add_row(vec!["Demand".to_string(), measure.demand.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{measure}"),
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(ports),
        OutputFormat::Table => {
            let mut table = table(vec!["PORT", "TYPE", "MANUFACTURER", "PRODUCT"]);
            for port in ports {
                table.add_row(vec![
                    port.name.as_str(),
                    port.kind,
                    port.manufacturer.as_deref().unwrap_or("-"),
                    port.product.as_deref().unwrap_or("-"),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Available serial ports:");
            for port in ports {
                println!(
                    "\t{}: {} {}",
                    port.name,
                    port.manufacturer.as_deref().unwrap_or(""),
                    port.product.as_deref().unwrap_or("")
                );
            }
        }
    }
}

#[derive(Serialize)]
pub struct InfoReport {
    pub address: u8,
    pub version: Version,
    pub barcode: Barcode,
}

pub fn print_info(info: &InfoReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(info),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Load Info:");
            println!("  Address:  {}", info.address);
            println!("  Model:    {}", info.version.model);
            println!(
                "  Firmware: {}.{}",
                info.version.firmware_major, info.version.firmware_minor
            );
            println!("  Serial:   {}", info.version.serial_number);
            println!("  Barcode:  {}", info.barcode);
        }
    }
}

#[derive(Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub command_id: Option<String>,
    pub response_id: Option<String>,
    pub shape: &'static str,
    pub fields: Vec<String>,
}

impl From<&CommandDef> for CatalogEntry {
    fn from(def: &CommandDef) -> Self {
        Self {
            name: def.name,
            command_id: def.command_id.map(hex_id),
            response_id: def.response_id.map(hex_id),
            shape: def.shape().as_str(),
            fields: def.fields.iter().map(describe_field).collect(),
        }
    }
}

/// `name:kind/width`, e.g. `amps:scaled(10000)/4`.
pub fn describe_field(field: &Field) -> String {
    let kind = match field.kind {
        FieldKind::Raw => "raw".to_string(),
        FieldKind::Bool => "bool".to_string(),
        FieldKind::Scaled(factor) => format!("scaled({factor})"),
        FieldKind::Enum(domain) => format!("enum({})", domain.name),
        FieldKind::Flags(set) => format!("flags({})", set.name),
        FieldKind::Text => "text".to_string(),
    };
    format!("{}:{}/{}", field.name, kind, field.width)
}

pub fn print_catalog(entries: &[CatalogEntry], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Table => {
            let mut table = table(vec!["NAME", "CMD", "RESP", "SHAPE", "FIELDS"]);
            for entry in entries {
                table.add_row(vec![
                    entry.name.to_string(),
                    entry.command_id.clone().unwrap_or_else(|| "-".to_string()),
                    entry.response_id.clone().unwrap_or_else(|| "-".to_string()),
                    entry.shape.to_string(),
                    entry.fields.join(", "),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for entry in entries {
                println!(
                    "{:<22} cmd={:<4} resp={:<4} {}",
                    entry.name,
                    entry.command_id.as_deref().unwrap_or("-"),
                    entry.response_id.as_deref().unwrap_or("-"),
                    entry.fields.join(" ")
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bkload::catalog::catalog::{CURRENT_TRANSIENT, MEASURE};

    use super::*;

    #[test]
    fn field_descriptions() {
        assert_eq!(
            describe_field(&CURRENT_TRANSIENT.fields[0]),
            "value_a:scaled(10000)/4"
        );
        assert_eq!(
            describe_field(&MEASURE.fields[4]),
            "demand:flags(DemandState)/2"
        );
    }

    #[test]
    fn catalog_entry_uses_hex_ids() {
        let entry = CatalogEntry::from(&MEASURE);
        assert_eq!(entry.command_id, None);
        assert_eq!(entry.response_id.as_deref(), Some("0x5F"));
        assert_eq!(entry.shape, "response");
    }
}
