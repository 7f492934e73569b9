//! Typed records and line parsers for every stage boundary.
//!
//! Each source and intermediate format has a parser that turns one raw line
//! into a typed record. Malformed lines yield `None` and are dropped by the
//! caller; per the error-handling policy they are never surfaced as errors.

use serde::{Deserialize, Serialize};

/// One track with a known release year, from the track-year source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackYearFact {
    pub track_id: String,
    pub year: i32,
}

/// One genre annotation for a track. A track may carry several.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackGenreFact {
    pub track_id: String,
    pub genre: String,
}

/// Stage 1 output: one (year, genre) observation per joined combination.
/// Duplicates across tracks are expected; Stage 2 counts them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearGenre {
    pub year: i32,
    pub genre: String,
}

/// Stage 2 output: total observations per (year, genre).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GenreYearCount {
    pub year: i32,
    pub genre: String,
    pub count: u64,
}

/// Stage 3 output: a count row enriched with the unemployment rate for its
/// year. Rows whose year has no rate never become an `EnrichedRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub year: i32,
    pub genre: String,
    pub count: u64,
    pub rate: f64,
}

impl YearGenre {
    pub fn to_tsv(&self) -> String {
        format!("{}\t{}", self.year, self.genre)
    }
}

impl GenreYearCount {
    pub fn to_tsv(&self) -> String {
        format!("{}\t{}\t{}", self.year, self.genre, self.count)
    }
}

impl EnrichedRecord {
    /// Materialized form; the rate is written with two decimal places.
    pub fn to_tsv(&self) -> String {
        format!("{}\t{}\t{}\t{:.2}", self.year, self.genre, self.count, self.rate)
    }
}

/// Parse a line of the track-year source:
/// `YEAR<delimiter>TRACKID<delimiter>...` with trailing fields ignored.
///
/// Drops blank lines, lines with fewer than two fields, non-numeric years,
/// empty track ids, and years below `earliest_year` (no rate can ever exist
/// for them).
pub fn parse_track_year(line: &str, delimiter: &str, earliest_year: i32) -> Option<TrackYearFact> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.split(delimiter);
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let track_id = parts.next()?.trim();

    if year < earliest_year || track_id.is_empty() {
        return None;
    }

    Some(TrackYearFact {
        track_id: track_id.to_string(),
        year,
    })
}

/// Parse a line of the genre source: `TRACKID\tGENRE`.
///
/// Blank lines and `#` comments are skipped; lines with fewer than two
/// fields or an empty field are dropped.
pub fn parse_track_genre(line: &str) -> Option<TrackGenreFact> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut parts = line.split('\t');
    let track_id = parts.next()?.trim();
    let genre = parts.next()?.trim();

    if track_id.is_empty() || genre.is_empty() {
        return None;
    }

    Some(TrackGenreFact {
        track_id: track_id.to_string(),
        genre: genre.to_string(),
    })
}

/// Parse a Stage 1 -> Stage 2 line: `year\tgenre`.
pub fn parse_year_genre(line: &str) -> Option<YearGenre> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.split('\t');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let genre = parts.next()?.trim();

    if genre.is_empty() {
        return None;
    }

    Some(YearGenre {
        year,
        genre: genre.to_string(),
    })
}

/// Parse a Stage 2 -> Stage 3 line: `year\tgenre\tcount`.
pub fn parse_genre_year_count(line: &str) -> Option<GenreYearCount> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.split('\t');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let genre = parts.next()?.trim();
    let count: u64 = parts.next()?.trim().parse().ok()?;

    if genre.is_empty() {
        return None;
    }

    Some(GenreYearCount {
        year,
        genre: genre.to_string(),
        count,
    })
}

/// Parse a Stage 3 output line: `year\tgenre\tcount\trate`.
pub fn parse_enriched(line: &str) -> Option<EnrichedRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.split('\t');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let genre = parts.next()?.trim();
    let count: u64 = parts.next()?.trim().parse().ok()?;
    let rate: f64 = parts.next()?.trim().parse().ok()?;

    if genre.is_empty() {
        return None;
    }

    Some(EnrichedRecord {
        year,
        genre: genre.to_string(),
        count,
        rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_year() {
        let fact = parse_track_year("1991<SEP>TRAAAAW128F429D538<SEP>Artist<SEP>Song", "<SEP>", 1948)
            .unwrap();
        assert_eq!(fact.year, 1991);
        assert_eq!(fact.track_id, "TRAAAAW128F429D538");
    }

    #[test]
    fn test_parse_track_year_trailing_fields_ignored() {
        // Only the first two fields matter
        let fact = parse_track_year("2001<SEP>TRX<SEP>a<SEP>b<SEP>c<SEP>d", "<SEP>", 1948).unwrap();
        assert_eq!(fact.track_id, "TRX");
    }

    #[test]
    fn test_parse_track_year_custom_delimiter() {
        let fact = parse_track_year("1975\tTRY123\tArtist", "\t", 1948).unwrap();
        assert_eq!(fact.year, 1975);
        assert_eq!(fact.track_id, "TRY123");
    }

    #[test]
    fn test_parse_track_year_rejects_bad_lines() {
        assert!(parse_track_year("", "<SEP>", 1948).is_none());
        assert!(parse_track_year("   ", "<SEP>", 1948).is_none());
        assert!(parse_track_year("1991", "<SEP>", 1948).is_none());
        assert!(parse_track_year("notayear<SEP>TRX", "<SEP>", 1948).is_none());
        assert!(parse_track_year("1991<SEP>  ", "<SEP>", 1948).is_none());
    }

    #[test]
    fn test_parse_track_year_floor() {
        // 1947 predates the reference series
        assert!(parse_track_year("1947<SEP>TRX", "<SEP>", 1948).is_none());
        assert!(parse_track_year("1948<SEP>TRX", "<SEP>", 1948).is_some());
    }

    #[test]
    fn test_parse_track_genre() {
        let fact = parse_track_genre("TRAAAAW128F429D538\trock").unwrap();
        assert_eq!(fact.track_id, "TRAAAAW128F429D538");
        assert_eq!(fact.genre, "rock");
    }

    #[test]
    fn test_parse_track_genre_skips_comments_and_blanks() {
        assert!(parse_track_genre("# generated annotations").is_none());
        assert!(parse_track_genre("").is_none());
        assert!(parse_track_genre("   ").is_none());
    }

    #[test]
    fn test_parse_track_genre_rejects_bad_lines() {
        assert!(parse_track_genre("TRX").is_none());
        assert!(parse_track_genre("TRX\t").is_none());
        assert!(parse_track_genre("\tjazz").is_none());
    }

    #[test]
    fn test_parse_year_genre() {
        let row = parse_year_genre("1991\trock").unwrap();
        assert_eq!(row, YearGenre { year: 1991, genre: "rock".to_string() });
        assert!(parse_year_genre("x\trock").is_none());
        assert!(parse_year_genre("1991").is_none());
    }

    #[test]
    fn test_parse_genre_year_count() {
        let row = parse_genre_year_count("1991\trock\t42").unwrap();
        assert_eq!(row.count, 42);
        assert!(parse_genre_year_count("1991\trock").is_none());
        assert!(parse_genre_year_count("1991\trock\tmany").is_none());
    }

    #[test]
    fn test_enriched_round_trip() {
        let record = EnrichedRecord {
            year: 1991,
            genre: "rock".to_string(),
            count: 42,
            rate: 6.85,
        };
        let line = record.to_tsv();
        assert_eq!(line, "1991\trock\t42\t6.85");
        assert_eq!(parse_enriched(&line).unwrap(), record);
    }

    #[test]
    fn test_enriched_rate_written_with_two_decimals() {
        let record = EnrichedRecord {
            year: 1955,
            genre: "jazz".to_string(),
            count: 3,
            rate: 4.0,
        };
        assert_eq!(record.to_tsv(), "1955\tjazz\t3\t4.00");
    }

    #[test]
    fn test_parse_enriched_rejects_short_lines() {
        assert!(parse_enriched("1991\trock\t42").is_none());
        assert!(parse_enriched("").is_none());
    }
}
