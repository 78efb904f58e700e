use crate::models::ReviewWithBusiness;

const HEADER: [&str; 8] = [
    "business_slug",
    "business_name",
    "rating",
    "comment",
    "contact_email",
    "created_at",
    "seen",
    "flagged",
];

fn bool_field(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Serializes the joined review rows to CSV bytes, preserving input order.
/// Booleans are rendered in their stored 0/1 form, timestamps as RFC 3339,
/// absent optional fields as empty. Quoting of commas, quotes, and newlines
/// inside free-text fields is handled by the writer.
pub fn reviews_to_csv(rows: &[ReviewWithBusiness]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for row in rows {
        writer.write_record([
            row.business_slug.as_str(),
            row.business_name.as_str(),
            &row.rating.to_string(),
            row.comment.as_deref().unwrap_or(""),
            row.contact_email.as_deref().unwrap_or(""),
            &row.created_at.to_rfc3339(),
            bool_field(row.seen),
            bool_field(row.flagged),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn review(comment: Option<&str>, rating: i64, flagged: bool) -> ReviewWithBusiness {
        ReviewWithBusiness {
            id: 1,
            business_slug: "demo".to_string(),
            business_name: "Demo Shop".to_string(),
            rating,
            comment: comment.map(str::to_string),
            contact_email: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            seen: false,
            flagged,
        }
    }

    #[test]
    fn header_row_has_exact_field_names() {
        let bytes = reviews_to_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "business_slug,business_name,rating,comment,contact_email,created_at,seen,flagged"
        );
    }

    #[test]
    fn booleans_render_as_stored_integers() {
        let bytes = reviews_to_csv(&[review(None, 1, true)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        assert!(data_line.ends_with(",0,1"), "line was: {data_line}");
    }

    #[test]
    fn comma_in_comment_is_quoted_and_round_trips() {
        let rows = vec![
            review(Some("Fast, friendly service"), 5, false),
            review(None, 4, false),
        ];
        let bytes = reviews_to_csv(&rows).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"Fast, friendly service\""));

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let records: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][3], "Fast, friendly service");
        assert_eq!(&records[1][3], "");
    }

    #[test]
    fn quotes_and_newlines_round_trip() {
        let rows = vec![review(Some("She said \"wow\"\nthen left"), 3, false)];
        let bytes = reviews_to_csv(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[3], "She said \"wow\"\nthen left");
    }

    #[test]
    fn rows_preserve_input_order() {
        let rows = vec![
            review(Some("first"), 5, false),
            review(Some("second"), 2, true),
        ];
        let bytes = reviews_to_csv(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("first"));
        assert!(lines[2].contains("second"));
    }
}
