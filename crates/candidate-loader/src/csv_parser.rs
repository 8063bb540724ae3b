//! CSV parsing for the stock universe.
//!
//! Expected header (order free, names case-insensitive):
//! `ticker, price, market_cap, pe_ratio, sector, volatility, volatility_category, Summary`

use std::collections::HashSet;

use csv::StringRecord;
use swipe_core::{Candidate, SwipeError};

/// Column positions resolved from the header row
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    width: usize,
    ticker: usize,
    price: usize,
    market_cap: usize,
    pe_ratio: usize,
    sector: usize,
    volatility: usize,
    volatility_category: usize,
    summary: usize,
}

impl HeaderIndex {
    pub fn from_headers(headers: &StringRecord) -> Result<Self, SwipeError> {
        let find = |name: &str| -> Result<usize, SwipeError> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| SwipeError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            width: headers.len(),
            ticker: find("ticker")?,
            price: find("price")?,
            market_cap: find("market_cap")?,
            pe_ratio: find("pe_ratio")?,
            sector: find("sector")?,
            volatility: find("volatility")?,
            volatility_category: find("volatility_category")?,
            summary: find("summary")?,
        })
    }

    /// Number of columns every data row must have
    pub fn width(&self) -> usize {
        self.width
    }
}

/// Result of parsing one data row
#[derive(Debug)]
pub enum RowOutcome {
    /// Row produced a valid candidate
    Parsed(Candidate),
    /// Row has the wrong number of columns; the load continues without it
    Skipped(SwipeError),
    /// Row is unusable and the whole load must stop
    Failed(SwipeError),
}

/// Outcome of a complete parse
#[derive(Debug, Default)]
pub struct LoadReport {
    pub candidates: Vec<Candidate>,
    pub skipped_rows: usize,
}

/// Finite number or a parse error; `NaN` and `inf` spellings are rejected
fn parse_number(line: u64, column: &str, raw: &str) -> Result<f64, SwipeError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SwipeError::Parse {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn parse_numbers(
    line: u64,
    header: &HeaderIndex,
    record: &StringRecord,
) -> Result<[f64; 4], SwipeError> {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    Ok([
        parse_number(line, "price", field(header.price))?,
        parse_number(line, "market_cap", field(header.market_cap))?,
        parse_number(line, "pe_ratio", field(header.pe_ratio))?,
        parse_number(line, "volatility", field(header.volatility))?,
    ])
}

/// Parse a single data row against the resolved header.
pub fn parse_row(line: u64, header: &HeaderIndex, record: &StringRecord) -> RowOutcome {
    if record.len() != header.width {
        return RowOutcome::Skipped(SwipeError::RowShape {
            line,
            expected: header.width,
            found: record.len(),
        });
    }

    let field = |idx: usize| record.get(idx).unwrap_or("");

    let [price, market_cap, pe_ratio, volatility] = match parse_numbers(line, header, record) {
        Ok(values) => values,
        Err(e) => return RowOutcome::Failed(e),
    };

    match Candidate::new(
        field(header.ticker),
        price,
        market_cap,
        pe_ratio,
        field(header.sector),
        volatility,
        field(header.volatility_category).trim(),
        field(header.summary),
    ) {
        Ok(candidate) => RowOutcome::Parsed(candidate),
        Err(e) => RowOutcome::Failed(e),
    }
}

/// Parse a complete CSV document into candidates, in file order.
///
/// Rows with a column count different from the header are dropped and
/// counted in [`LoadReport::skipped_rows`]. The first parse or validation
/// failure (including a repeated ticker) aborts the load.
pub fn parse_candidates(csv_data: &str) -> Result<LoadReport, SwipeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| SwipeError::Malformed(e.to_string()))?
        .clone();
    let header = HeaderIndex::from_headers(&headers)?;

    let mut report = LoadReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for result in reader.records() {
        let record = result.map_err(|e| SwipeError::Malformed(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        match parse_row(line, &header, &record) {
            RowOutcome::Parsed(candidate) => {
                if !seen.insert(candidate.ticker().to_string()) {
                    return Err(SwipeError::Validation(format!(
                        "duplicate ticker {} on line {}",
                        candidate.ticker(),
                        line
                    )));
                }
                report.candidates.push(candidate);
            }
            RowOutcome::Skipped(reason) => {
                tracing::debug!("Skipping row: {}", reason);
                report.skipped_rows += 1;
            }
            RowOutcome::Failed(e) => return Err(e),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ticker,price,market_cap,pe_ratio,sector,volatility,volatility_category,Summary\n";

    #[test]
    fn test_parse_csv() {
        let csv = format!(
            "{HEADER}\
             AAPL,190.5,2900000000000,29.1,Technology,0.28,Medium,\"Designs phones, tablets and wearables\"\n\
             XOM,110.2,450000000000,13.4,Energy,0.22,Low,Integrated oil and gas\n"
        );

        let report = parse_candidates(&csv).unwrap();
        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(report.candidates[0].ticker(), "AAPL");
        assert_eq!(
            report.candidates[0].summary(),
            "Designs phones, tablets and wearables"
        );
        assert_eq!(report.candidates[1].sector(), "Energy");
        assert_eq!(report.candidates[1].volatility_category(), "Low");
    }

    #[test]
    fn test_shape_mismatch_is_skipped() {
        let csv = format!(
            "{HEADER}\
             AAPL,190.5,2900000000000,29.1,Technology,0.28,Medium,Phones\n\
             BROKEN,1.0,2.0\n\
             MSFT,410.0,3000000000000,35.0,Technology,0.25,Medium,Software,extra\n\
             NEE,70.0,140000000000,20.0,Utilities,0.18,Low,Power\n"
        );

        let report = parse_candidates(&csv).unwrap();
        let tickers: Vec<&str> = report.candidates.iter().map(|c| c.ticker()).collect();
        assert_eq!(tickers, vec!["AAPL", "NEE"]);
        assert_eq!(report.skipped_rows, 2);
    }

    #[test]
    fn test_unparsable_number_aborts_load() {
        let csv = format!(
            "{HEADER}\
             AAPL,190.5,2900000000000,29.1,Technology,0.28,Medium,Phones\n\
             TSLA,abc,800000000000,60.0,Consumer,0.55,High,Cars\n\
             NEE,70.0,140000000000,20.0,Utilities,0.18,Low,Power\n"
        );

        match parse_candidates(&csv) {
            Err(SwipeError::Parse { line, column, value }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "price");
                assert_eq!(value, "abc");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_number_aborts_load() {
        let csv = format!(
            "{HEADER}\
             AAA,10.0,1000000000,10.0,Technology,0.2,Low,Chips\n\
             BBB,12.0,1000000000,NaN,Technology,0.2,Low,Chips\n\
             CCC,14.0,1000000000,20.0,Technology,0.2,Low,Chips\n"
        );
        match parse_candidates(&csv) {
            Err(SwipeError::Parse { line, column, value }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "pe_ratio");
                assert_eq!(value, "NaN");
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        for raw in ["inf", "-inf", "infinity"] {
            let csv = format!("{HEADER}AAA,10.0,1000000000,10.0,Technology,{raw},Low,Chips\n");
            assert!(
                matches!(parse_candidates(&csv), Err(SwipeError::Parse { .. })),
                "{} should not parse",
                raw
            );
        }
    }

    #[test]
    fn test_invalid_record_aborts_load() {
        let csv = format!("{HEADER}AAPL,-1.0,2900000000000,29.1,Technology,0.28,Medium,Phones\n");
        assert!(matches!(parse_candidates(&csv), Err(SwipeError::Validation(_))));

        let csv = format!("{HEADER},1.0,2.0,3.0,Technology,0.28,Medium,No ticker\n");
        assert!(matches!(parse_candidates(&csv), Err(SwipeError::Validation(_))));
    }

    #[test]
    fn test_duplicate_ticker_aborts_load() {
        let csv = format!(
            "{HEADER}\
             AAPL,190.5,1.0,29.1,Technology,0.28,Medium,Phones\n\
             AAPL,191.0,1.0,29.1,Technology,0.28,Medium,Phones again\n"
        );
        assert!(matches!(parse_candidates(&csv), Err(SwipeError::Validation(_))));
    }

    #[test]
    fn test_missing_column() {
        let csv = "ticker,price,market_cap,pe_ratio,sector,volatility,Summary\n";
        match parse_candidates(csv) {
            Err(SwipeError::MissingColumn(col)) => assert_eq!(col, "volatility_category"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_header_is_case_insensitive_and_reorderable() {
        let csv = "Sector,TICKER,summary,price,market_cap,pe_ratio,volatility,volatility_category\n\
                   Energy,CVX,Oil major,150,280000000000,14,0.2,Low\n";
        let report = parse_candidates(csv).unwrap();
        assert_eq!(report.candidates[0].ticker(), "CVX");
        assert_eq!(report.candidates[0].summary(), "Oil major");
        assert_eq!(report.candidates[0].price(), 150.0);
    }

    #[test]
    fn test_parse_csv_empty() {
        let report = parse_candidates(HEADER).unwrap();
        assert!(report.candidates.is_empty());
        assert_eq!(report.skipped_rows, 0);
    }
}
