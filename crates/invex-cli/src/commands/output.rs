//! Output formatting for invoice records.

use invex_core::InvoiceRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per line item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "vendor",
        "invoice_number",
        "invoice_date",
        "subtotal",
        "tax",
        "total",
        "description",
        "quantity",
        "unit_price",
        "line_total",
    ])?;

    let invoice_number = record.invoice_number().unwrap_or_default();
    let invoice_date = record
        .invoice_date()
        .map(|d| d.to_string())
        .unwrap_or_default();

    let subtotal = record.subtotal().to_string();
    let tax = record.tax().to_string();
    let total = record.total().to_string();

    for item in record.line_items() {
        let quantity = item.quantity().to_string();
        let unit_price = item.unit_price().to_string();
        let line_total = item.line_total().to_string();

        wtr.write_record([
            record.vendor(),
            invoice_number,
            invoice_date.as_str(),
            subtotal.as_str(),
            tax.as_str(),
            total.as_str(),
            item.description(),
            quantity.as_str(),
            unit_price.as_str(),
            line_total.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Vendor: {}\n", record.vendor()));
    output.push_str(&format!(
        "Invoice: {}\n",
        record.invoice_number().unwrap_or("-")
    ));
    match record.invoice_date() {
        Some(date) => output.push_str(&format!("Date: {}\n", date)),
        None => output.push_str("Date: -\n"),
    }
    output.push('\n');

    output.push_str("Line items:\n");
    for item in record.line_items() {
        output.push_str(&format!(
            "  {} x {} @ {} = {}\n",
            item.description(),
            item.quantity(),
            item.unit_price(),
            item.line_total()
        ));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Subtotal: {}\n", record.subtotal()));
    output.push_str(&format!("  Tax:      {}\n", record.tax()));
    output.push_str(&format!("  Total:    {}\n", record.total()));

    output
}
