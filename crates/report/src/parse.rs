use chrono::NaiveDate;
use osdash_core::{classify_brand, order, Money, ServiceOrder};
use thiserror::Error;

/// Header discovery scans at most this many leading lines; exports
/// usually carry a short title/metadata preamble, never a long one.
const HEADER_SCAN_LIMIT: usize = 20;
/// Diagnostic snippet length attached to structural failures.
const SNIPPET_LEN: usize = 1000;

// Header markers, matched case-insensitively as substrings. A line is
// the header when it names the client and at least one value or status
// column.
const MARKER_CLIENT: &str = "CLIENTE";
const MARKER_TOTAL_VALUE: &str = "VALOR TOTAL";
const MARKER_COST_VALUE: &str = "VALOR CUSTO";
const MARKER_STATUS: &str = "SITUA";
const MARKER_STATUS_ALIAS: &str = "STATUS";
const MARKER_DATE_EXACT: &str = "DATA";
const MARKER_DATE_OPEN: &str = "DATA ABERTURA";
const MARKER_EQUIPMENT: &str = "EQUIPAMENTO";
const MARKER_EQUIPMENT_ALIAS: &str = "APARELHO";
const MARKER_ORIGIN_SURVEY: &str = "COMO CONHECEU";
const MARKER_ORIGIN: &str = "ORIGEM";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Cabeçalho não encontrado (procuramos por 'Cliente' e 'Valor').")]
    HeaderNotFound { snippet: String },
    #[error("Nenhum dado encontrado após o cabeçalho.")]
    NoDataRows { snippet: String },
}

impl ParseError {
    /// First characters of the offending file, for diagnostic display.
    pub fn snippet(&self) -> &str {
        match self {
            ParseError::HeaderNotFound { snippet } | ParseError::NoDataRows { snippet } => snippet,
        }
    }
}

/// Column roles resolved from the header line. Unmapped roles fall back
/// to the sentinels in [`osdash_core::order`].
#[derive(Debug, Default)]
struct ColumnMap {
    client: Option<usize>,
    total_value: Option<usize>,
    cost_value: Option<usize>,
    status: Option<usize>,
    date: Option<usize>,
    equipment: Option<usize>,
    origin: Option<usize>,
}

impl ColumnMap {
    /// Classifies each header cell into at most one role, checking in a
    /// fixed order. A later column claiming an already-mapped role
    /// overrides the earlier one.
    fn from_headers(headers: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for (idx, cell) in headers.iter().enumerate() {
            let upper = cell.to_uppercase();
            if upper.contains(MARKER_CLIENT) {
                map.client = Some(idx);
            } else if upper.contains(MARKER_TOTAL_VALUE) {
                map.total_value = Some(idx);
            } else if upper.contains(MARKER_COST_VALUE) {
                map.cost_value = Some(idx);
            } else if upper.contains(MARKER_STATUS) || upper.contains(MARKER_STATUS_ALIAS) {
                map.status = Some(idx);
            } else if upper == MARKER_DATE_EXACT || upper.contains(MARKER_DATE_OPEN) {
                map.date = Some(idx);
            } else if upper.contains(MARKER_EQUIPMENT) || upper.contains(MARKER_EQUIPMENT_ALIAS) {
                map.equipment = Some(idx);
            } else if upper.contains(MARKER_ORIGIN_SURVEY) || upper.contains(MARKER_ORIGIN) {
                map.origin = Some(idx);
            }
        }
        map
    }

    /// Rows shorter than this are dropped: they cannot carry the client
    /// cell the rest of the pipeline keys on.
    fn min_row_len(&self) -> usize {
        self.client.map(|idx| idx + 1).unwrap_or(0)
    }
}

/// Parses one report export into service-order records.
///
/// Structural problems (no recognizable header, a header with no data
/// rows after it) fail the whole parse. Cell-level problems never do:
/// bad currency is zero, a bad date stays absent, missing columns get
/// sentinel values.
pub fn parse_report(text: &str) -> Result<Vec<ServiceOrder>, ParseError> {
    let lines = split_lines(text);

    let mut header: Option<(usize, char, ColumnMap)> = None;
    for (idx, line) in lines.iter().take(HEADER_SCAN_LIMIT).enumerate() {
        if is_header_line(line) {
            let delimiter = infer_delimiter(line);
            let headers: Vec<String> = line
                .split(delimiter)
                .map(clean_header_cell)
                .collect();
            header = Some((idx, delimiter, ColumnMap::from_headers(&headers)));
            break;
        }
    }

    let Some((header_idx, delimiter, map)) = header else {
        return Err(ParseError::HeaderNotFound {
            snippet: snippet_of(text),
        });
    };
    tracing::debug!(header_line = header_idx, %delimiter, "header located");

    let mut orders = Vec::new();
    for (offset, raw_line) in lines[header_idx + 1..].iter().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let id = header_idx + 1 + offset;

        let tokens: Vec<String> = split_quote_aware(line, delimiter)
            .into_iter()
            .map(|t| clean_token(&t))
            .collect();
        if tokens.len() < map.min_row_len() {
            tracing::debug!(line = id, cells = tokens.len(), "row dropped: too few cells");
            continue;
        }

        orders.push(assemble_order(id, &tokens, &map));
    }

    if orders.is_empty() {
        return Err(ParseError::NoDataRows {
            snippet: snippet_of(text),
        });
    }

    tracing::debug!(records = orders.len(), "report parsed");
    Ok(orders)
}

fn assemble_order(id: usize, tokens: &[String], map: &ColumnMap) -> ServiceOrder {
    let cell = |idx: Option<usize>| idx.and_then(|i| tokens.get(i)).map(String::as_str);

    let raw_date = cell(map.date).unwrap_or("").to_string();
    let parsed_date = parse_day_first_date(&raw_date);
    let iso_date = parsed_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let equipment = cell(map.equipment).unwrap_or("").to_string();
    let brand = classify_brand(&equipment);

    ServiceOrder {
        id,
        client: cell(map.client).unwrap_or(order::UNKNOWN_CLIENT).to_string(),
        total_value: Money::parse_lossy(cell(map.total_value).unwrap_or("")),
        cost_value: Money::parse_lossy(cell(map.cost_value).unwrap_or("")),
        status: cell(map.status).unwrap_or(order::UNDEFINED_STATUS).to_string(),
        raw_date,
        parsed_date,
        iso_date,
        equipment,
        brand,
        origin: cell(map.origin).unwrap_or(order::UNINFORMED_ORIGIN).to_string(),
    }
}

/// Splits on `\n`, `\r\n`, or `\r` uniformly.
fn split_lines(text: &str) -> Vec<&str> {
    text.split("\r\n")
        .flat_map(|chunk| chunk.split(['\r', '\n']))
        .collect()
}

fn is_header_line(line: &str) -> bool {
    let upper = line.to_uppercase();
    // Discovery is looser than mapping: any of the value markers or the
    // "SITU" stem alongside the client marker qualifies the line.
    upper.contains(MARKER_CLIENT)
        && (upper.contains("VALOR") || upper.contains("TOTAL") || upper.contains("SITU"))
}

/// Semicolon wins only when strictly more frequent than comma on the
/// header line; inferred once per file.
fn infer_delimiter(header_line: &str) -> char {
    let commas = header_line.matches(',').count();
    let semis = header_line.matches(';').count();
    if semis > commas {
        ';'
    } else {
        ','
    }
}

/// Header cells lose every quote character, then surrounding whitespace.
fn clean_header_cell(cell: &str) -> String {
    cell.chars()
        .filter(|c| !matches!(c, '"' | '\''))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Splits a data line on the delimiter, but only where the remainder of
/// the line holds an even number of `"` characters, so quoted fields
/// may contain the delimiter.
fn split_quote_aware(line: &str, delimiter: char) -> Vec<String> {
    let total_quotes = line.matches('"').count();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut seen_quotes = 0usize;

    for ch in line.chars() {
        if ch == '"' {
            seen_quotes += 1;
        }
        if ch == delimiter && (total_quotes - seen_quotes) % 2 == 0 {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(ch);
        }
    }
    fields.push(field);
    fields
}

/// Data tokens lose one surrounding quote pair, then whitespace.
fn clean_token(token: &str) -> String {
    let t = token.strip_prefix('"').unwrap_or(token);
    let t = t.strip_suffix('"').unwrap_or(t);
    t.trim().to_string()
}

/// Day-first date policy: `DD/MM/YYYY`, tolerating trailing noise after
/// the year (timestamps like `05/03/2024 10:30`). Anything else leaves
/// the record dateless without failing it.
fn parse_day_first_date(raw: &str) -> Option<NaiveDate> {
    if raw.chars().count() < 8 {
        return None;
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year_text: String = parts[2].chars().take(4).collect();
    let year: i32 = year_text.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn snippet_of(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}
