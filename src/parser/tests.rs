use std::io::Cursor;

use super::*;

fn parse_bytes(input: &[u8]) -> ParsedOutput {
    parse(Cursor::new(input.to_vec()), &ParserOptions::new()).unwrap()
}

fn content_strings(output: &ParsedOutput) -> Vec<&[u8]> {
    output.content.iter().map(|v| v.as_slice()).collect()
}

#[test]
fn single_cell_file() {
    let out = parse_bytes(b"hello");
    assert_eq!(out.columns, 1);
    assert_eq!(out.cells.len(), 1);
    assert_eq!(content_strings(&out)[out.cells[0] as usize], b"hello");
}

#[test]
fn two_identical_lines_share_one_content_entry() {
    let out = parse_bytes(b"a\tb\na\tb\n");
    assert_eq!(out.columns, 2);
    assert_eq!(out.cells.len(), 4);
    assert_eq!(out.cells[0], out.cells[2]);
    assert_eq!(out.cells[1], out.cells[3]);
    // One empty placeholder plus "a" and "b".
    assert_eq!(out.content.len(), 3);
}

#[test]
fn quoted_cell_with_escaped_quote() {
    let out = parse_bytes(b"a\tb\n\"say \"\"hi\"\"\"\tb\n");
    assert_eq!(out.columns, 2);
    let first_row_first_cell = out.cells[2] as usize;
    assert_eq!(out.content[first_row_first_cell], b"say \"hi\"");
}

#[test]
fn sparse_columns_pad_with_empty_cells() {
    let out = parse_bytes(b"a\tb\tc\nx\n");
    assert_eq!(out.columns, 3);
    assert_eq!(&out.cells[3..6], &[out.cells[3], 0, 0]);
    assert_eq!(out.content[out.cells[3] as usize], b"x");
}

#[test]
fn extra_cell_beyond_column_count_is_recorded_as_unexpected() {
    let out = parse_bytes(b"a\tb\nc\td\te\n");
    assert_eq!(out.columns, 2);
    assert_eq!(out.unexpected_cells.len(), 1);
    let unexpected = &out.unexpected_cells[0];
    assert_eq!(unexpected.line, 1);
    assert_eq!(unexpected.column, 2);
    assert_eq!(unexpected.bytes, b"e");
    assert!(unexpected.column_name.is_none());
}

#[test]
fn leading_empty_cells_are_not_recorded_as_unexpected() {
    let out = parse_bytes(b"a\tb\n\t\tc\n");
    // Row has 3 cells against 2 declared columns, but the overflow is
    // the trailing non-empty "c", not the leading empties.
    assert_eq!(out.unexpected_cells.len(), 1);
    assert_eq!(out.unexpected_cells[0].bytes, b"c");
}

#[test]
fn semicolon_separator_is_detected() {
    let out = parse_bytes(b"a;b;c\n1;2;3\n");
    assert_eq!(out.columns, 3);
    assert_eq!(out.separator, b';');
}

#[test]
fn space_separated_headers_revert_to_tab_from_second_line() {
    let out = parse_bytes(b"a b c\n1\t2\t3\n");
    assert!(out.space_separated_headers);
    assert_eq!(out.separator, b'\t');
    assert_eq!(out.columns, 3);
    assert_eq!(out.content[out.cells[3] as usize], b"1");
    assert_eq!(out.content[out.cells[4] as usize], b"2");
    assert_eq!(out.content[out.cells[5] as usize], b"3");
}

#[test]
fn empty_input_yields_zero_columns() {
    let out = parse_bytes(b"");
    assert_eq!(out.columns, 0);
    assert!(out.cells.is_empty());
    assert_eq!(out.content.len(), 1);
}

#[test]
fn no_separator_present_defaults_to_single_column() {
    let out = parse_bytes(b"onlyvalue\nanother\n");
    assert_eq!(out.columns, 1);
    assert_eq!(out.separator, b'\t');
    assert_eq!(out.cells.len(), 2);
}

#[test]
fn max_line_count_truncates_and_sets_flag() {
    let options = ParserOptions::new().with_max_line_count(1);
    let out = parse(Cursor::new(b"a\tb\n1\t2\n3\t4\n5\t6\n".to_vec()), &options).unwrap();
    assert!(out.is_truncated);
    // header (2 cells) + one data line (2 cells) = 4, nothing more.
    assert_eq!(out.cells.len(), 4);
}

#[test]
fn truncation_flag_is_set_even_when_eof_lands_exactly_on_the_cap() {
    let options = ParserOptions::new().with_max_line_count(1);
    let out = parse(Cursor::new(b"a\tb\n1\t2".to_vec()), &options).unwrap();
    assert!(out.is_truncated);
    assert_eq!(out.cells.len(), 4);
}

#[test]
fn values_longer_than_the_cap_are_truncated_silently() {
    let long = "x".repeat(MAXIMAL_VALUE_LENGTH + 500);
    let input = format!("a\n{long}\n");
    let out = parse_bytes(input.as_bytes());
    let stored = &out.content[out.cells[1] as usize];
    assert_eq!(stored.len(), MAXIMAL_VALUE_LENGTH);
}

#[test]
fn trailing_spaces_are_trimmed_outside_quotes() {
    let out = parse_bytes(b"a\n  padded value  \n");
    assert_eq!(out.content[out.cells[1] as usize], b"padded value");
}

#[test]
fn a_lone_unterminated_quote_degrades_to_a_literal_character() {
    // No trailing newline: the cell ends at EOF with just the opening
    // quote byte, which is too short to be treated as a closed pair.
    let out = parse_bytes(b"a\n\"");
    assert_eq!(out.content[out.cells[1] as usize], b"\"");
}

#[test]
fn spaces_inside_quotes_are_preserved() {
    let out = parse_bytes(b"a\n\"  padded value  \"\n");
    assert_eq!(out.content[out.cells[1] as usize], b"  padded value  ");
}
