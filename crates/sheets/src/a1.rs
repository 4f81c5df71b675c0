//! A1-notation helpers.

/// Quote a worksheet title for use in a range, doubling embedded quotes.
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Column letter for a 1-based column index (`1 -> A`, `27 -> AA`).
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Range covering one full row, e.g. `'Bookings'!1:1`.
pub fn whole_row(title: &str, row: u32) -> String {
    format!("{}!{row}:{row}", quote_title(title))
}

/// Range covering `width` cells of one row, e.g. `'Bookings'!A1:F1`.
pub fn row_span(title: &str, row: u32, width: usize) -> String {
    format!(
        "{}!A{row}:{}{row}",
        quote_title(title),
        column_letter(width.max(1))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(6), "F");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn titles_are_quoted() {
        assert_eq!(quote_title("Bookings"), "'Bookings'");
        assert_eq!(quote_title("Jane's sheet"), "'Jane''s sheet'");
    }

    #[test]
    fn header_range() {
        assert_eq!(row_span("Bookings", 1, 6), "'Bookings'!A1:F1");
        assert_eq!(whole_row("Contact", 1), "'Contact'!1:1");
    }
}
