use super::result::{AlignmentResult, ParseRelationError, Relation};
use super::scoring::PairOrientation;
use std::io::{self, Write};
use thiserror::Error;

pub const REPORT_HEADER: &str = "Query\tTarget\tRelation\tChainLength\tRMSD\tResidueLength\t[Aligned-Query]\t[Aligned-Target]\t[Query-Target:OrientationAngle]";

const COLUMN_COUNT: usize = 9;
const REPORT_COLUMNS: [&str; COLUMN_COUNT] = [
    "Query",
    "Target",
    "Relation",
    "ChainLength",
    "RMSD",
    "ResidueLength",
    "[Aligned-Query]",
    "[Aligned-Target]",
    "[Query-Target:OrientationAngle]",
];
const RECORD_BREAKS: &[char] = &['\t', '\n', '\r'];
const LIST_DELIMITERS: &[char] = &['\t', '\n', '\r', ',', ' ', '-', ':', '[', ']'];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Cannot write {field} '{value}' into the report: {reason}")]
    MalformedField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Failed to parse report on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Failed to encode report record: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error while writing report: {0}")]
    Io(#[from] io::Error),
}

impl ReportError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        ReportError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Reader errors carry the line of the offending record when csv knows it.
    fn from_reader(err: csv::Error, fallback_line: usize) -> Self {
        let line = err
            .position()
            .map_or(fallback_line, |pos| pos.line() as usize);
        ReportError::parse(line, err.to_string())
    }
}

// Fields are never quoted: the checks below keep tabs and line breaks out of
// every value, and quote characters in identifiers are written verbatim.
fn report_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn report_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .from_reader(text.as_bytes())
}

fn check_field(field: &'static str, value: &str) -> Result<(), ReportError> {
    if value.contains(RECORD_BREAKS) {
        return Err(ReportError::MalformedField {
            field,
            value: value.to_string(),
            reason: "contains a tab or line break",
        });
    }
    Ok(())
}

fn check_list_name(field: &'static str, value: &str) -> Result<(), ReportError> {
    if value.is_empty() {
        return Err(ReportError::MalformedField {
            field,
            value: String::new(),
            reason: "subunit name is empty",
        });
    }
    if value.contains(LIST_DELIMITERS) {
        return Err(ReportError::MalformedField {
            field,
            value: value.to_string(),
            reason: "contains a list delimiter",
        });
    }
    Ok(())
}

fn name_list(names: &[&str]) -> String {
    format!("[{}]", names.join(","))
}

fn orientation_list(orientations: &[PairOrientation]) -> String {
    let mut out = String::from("[ ");
    for o in orientations {
        out.push_str(&format!("{}-{}:{:.2} ", o.query, o.target, o.angle));
    }
    out.push(']');
    out
}

/// Renders the header and the data line of one comparison.
///
/// Orientation entries are written in the order given, which callers take from
/// the subunit map.
///
/// # Errors
///
/// Returns [`ReportError::MalformedField`] if an identifier or subunit name
/// would break the record layout, or if the number of orientations does not
/// match the number of mapped pairs.
pub fn render(
    query_id: &str,
    target_id: &str,
    result: &AlignmentResult,
    orientations: &[PairOrientation],
) -> Result<String, ReportError> {
    check_field("query identifier", query_id)?;
    check_field("target identifier", target_id)?;

    if orientations.len() != result.subunit_map().len() {
        return Err(ReportError::MalformedField {
            field: "orientation angles",
            value: orientations.len().to_string(),
            reason: "count differs from the number of mapped subunit pairs",
        });
    }

    let query_names: Vec<&str> = result.aligned_subunits1().iter().map(|s| s.name()).collect();
    let target_names: Vec<&str> = result.aligned_subunits2().iter().map(|s| s.name()).collect();
    for name in &query_names {
        check_list_name("query subunit name", name)?;
    }
    for name in &target_names {
        check_list_name("target subunit name", name)?;
    }
    for o in orientations {
        check_list_name("query subunit name", &o.query)?;
        check_list_name("target subunit name", &o.target)?;
    }

    let columns = [
        query_id.to_string(),
        target_id.to_string(),
        result.relation().to_string(),
        result.length().to_string(),
        format!("{:.2}", result.rmsd()),
        result.alignment().length().to_string(),
        name_list(&query_names),
        name_list(&target_names),
        orientation_list(orientations),
    ];

    let mut writer = report_writer();
    writer.write_record(REPORT_COLUMNS)?;
    writer.write_record(&columns)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ReportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Renders the report and writes it to `sink` in a single call.
pub fn write_report<W: Write>(
    sink: &mut W,
    query_id: &str,
    target_id: &str,
    result: &AlignmentResult,
    orientations: &[PairOrientation],
) -> Result<(), ReportError> {
    let text = render(query_id, target_id, result, orientations)?;
    sink.write_all(text.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// One parsed report record.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub query_id: String,
    pub target_id: String,
    pub relation: Relation,
    pub chain_length: usize,
    pub rmsd: f64,
    pub residue_length: usize,
    pub aligned_query: Vec<String>,
    pub aligned_target: Vec<String>,
    pub orientations: Vec<(String, String, f64)>,
}

fn strip_brackets(value: &str, line: usize) -> Result<&str, ReportError> {
    value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(|| ReportError::parse(line, format!("'{value}' is not a bracketed list")))
}

fn parse_names(value: &str, line: usize) -> Result<Vec<String>, ReportError> {
    let inner = strip_brackets(value, line)?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    Ok(inner.split(',').map(str::to_string).collect())
}

fn parse_orientations(value: &str, line: usize) -> Result<Vec<(String, String, f64)>, ReportError> {
    strip_brackets(value, line)?
        .split_whitespace()
        .map(|entry| {
            let (pair, angle) = entry
                .split_once(':')
                .ok_or_else(|| ReportError::parse(line, format!("'{entry}' has no angle")))?;
            let (query, target) = pair
                .split_once('-')
                .ok_or_else(|| ReportError::parse(line, format!("'{pair}' is not a subunit pair")))?;
            let angle = angle
                .parse::<f64>()
                .map_err(|e| ReportError::parse(line, format!("invalid angle '{angle}': {e}")))?;
            Ok((query.to_string(), target.to_string(), angle))
        })
        .collect()
}

fn parse_count(value: &str, column: &str, line: usize) -> Result<usize, ReportError> {
    value
        .parse()
        .map_err(|e| ReportError::parse(line, format!("invalid {column} '{value}': {e}")))
}

impl ReportRecord {
    /// Parses a rendered report: the header line followed by one data line.
    pub fn parse(text: &str) -> Result<Self, ReportError> {
        let mut reader = report_reader(text);

        let header = reader
            .headers()
            .map_err(|e| ReportError::from_reader(e, 1))?;
        if header.is_empty() {
            return Err(ReportError::parse(1, "report is empty"));
        }
        if header.iter().ne(REPORT_COLUMNS) {
            let found: Vec<&str> = header.iter().collect();
            return Err(ReportError::parse(
                1,
                format!("unexpected header '{}'", found.join("\t")),
            ));
        }

        let mut records = reader.records();
        let data = records
            .next()
            .ok_or_else(|| ReportError::parse(2, "missing data line"))?
            .map_err(|e| ReportError::from_reader(e, 2))?;
        if records.next().is_some() {
            return Err(ReportError::parse(3, "unexpected trailing record"));
        }

        let columns: Vec<&str> = data.iter().collect();
        if columns.len() != COLUMN_COUNT {
            return Err(ReportError::parse(
                2,
                format!("expected {} columns, found {}", COLUMN_COUNT, columns.len()),
            ));
        }

        let relation = columns[2]
            .parse::<Relation>()
            .map_err(|e: ParseRelationError| ReportError::parse(2, e.to_string()))?;
        let rmsd = columns[4]
            .parse::<f64>()
            .map_err(|e| ReportError::parse(2, format!("invalid RMSD '{}': {e}", columns[4])))?;

        Ok(Self {
            query_id: columns[0].to_string(),
            target_id: columns[1].to_string(),
            relation,
            chain_length: parse_count(columns[3], "chain length", 2)?,
            rmsd,
            residue_length: parse_count(columns[5], "residue length", 2)?,
            aligned_query: parse_names(columns[6], 2)?,
            aligned_target: parse_names(columns[7], 2)?,
            orientations: parse_orientations(columns[8], 2)?,
        })
    }
}
