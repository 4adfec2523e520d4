/// 1週間あたりの作業時間。
pub const HOURS_PER_WEEK: f64 = 44.0;
/// 1日あたりの作業時間。
pub const HOURS_PER_DAY: f64 = 8.0;

const MINUTES_PER_HOUR: f64 = 60.0;

/// 見積もり文字列で利用できる単位。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unit {
    Week,
    Day,
    Hour,
    Minute,
}

/// 単位を読み取る順番。
const UNITS: [Unit; 4] = [Unit::Week, Unit::Day, Unit::Hour, Unit::Minute];

impl Unit {
    fn suffix(self) -> char {
        match self {
            Unit::Week => 'w',
            Unit::Day => 'd',
            Unit::Hour => 'h',
            Unit::Minute => 'm',
        }
    }

    fn to_hours(self, count: f64) -> f64 {
        match self {
            Unit::Week => count * HOURS_PER_WEEK,
            Unit::Day => count * HOURS_PER_DAY,
            Unit::Hour => count,
            Unit::Minute => count / MINUTES_PER_HOUR,
        }
    }
}

/// 見積もり文字列を先頭から読み進めるためのカーソル。
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start_matches(is_separator);
    }

    /// 現在位置が`<数字><suffix>`であれば読み取って数値を返す。
    ///
    /// 一致しない場合は何も消費しない。
    fn take_component(&mut self, suffix: char) -> Option<f64> {
        let digits_len = self
            .rest
            .bytes()
            .take_while(|byte| byte.is_ascii_digit())
            .count();
        if digits_len == 0 {
            return None;
        }

        let (digits, tail) = self.rest.split_at(digits_len);
        let tail = tail.strip_prefix(suffix)?;
        self.rest = tail;

        Some(
            digits
                .bytes()
                .fold(0.0, |acc, byte| acc * 10.0 + f64::from(byte - b'0')),
        )
    }
}

/// 見積もり文字列(例: `1w 3d 2h 45m`, `3h 30m`, `45m`, `1d`)を時間に変換する。
///
/// 週、日、時間、分の順に各単位を1度だけ読み取り、単位の間の空白は読み飛ばす。
/// 順番通りに読めなかった残りの文字列は無視する。
/// 単位が1つも読めない場合は0を返し、エラーにはならない。
///
/// 1週間は44時間、1日は8時間として換算し、結果は小数点以下2桁に丸める。
///
/// # Arguments
///
/// * `input` - 見積もり文字列
///
/// # Examples
///
/// ```
/// assert_eq!(parse_hours("1w 3d 2h 45m"), 70.75);
/// ```
pub fn parse_hours(input: &str) -> f64 {
    let mut cursor = Cursor::new(input);
    let mut total = 0.0;

    for (index, unit) in UNITS.iter().enumerate() {
        if index > 0 {
            cursor.skip_whitespace();
        }
        if let Some(count) = cursor.take_component(unit.suffix()) {
            total += unit.to_hours(count);
        }
    }

    round_hours(total)
}

/// 単位の間で読み飛ばす空白文字。
///
/// Unicodeの空白に加えて、情報分離文字(U+001C..U+001F)も空白として扱う。
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// 小数点以下2桁に丸める。
fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{parse_hours, HOURS_PER_DAY, HOURS_PER_WEEK};

    /// 正常系のテスト。
    #[rstest]
    #[case::empty("", 0.0)]
    #[case::minutes("45m", 0.75)]
    #[case::hours_and_minutes("3h 30m", 3.5)]
    #[case::day("1d", 8.0)]
    #[case::week("1w", 44.0)]
    #[case::all_units("1w 3d 2h 45m", 70.75)]
    #[case::no_whitespace("1w3d2h45m", 70.75)]
    #[case::many_whitespaces("2h \t  15m", 2.25)]
    #[case::skip_units("1w 30m", 44.5)]
    #[case::multi_digits("12h", 12.0)]
    #[case::zero_count("0h", 0.0)]
    #[case::round_down("1m", 0.02)]
    #[case::round_up("10m", 0.17)]
    #[case::large_minutes("90m", 1.5)]
    #[case::no_break_space("1w\u{a0}3d", 68.0)]
    #[case::file_separator("1w\u{1c}3d", 68.0)]
    #[case::unit_separator("2h\u{1f}30m", 2.5)]
    fn test_parse_hours(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_hours(input), expected);
    }

    /// 単位が見つからない、または順番通りでない入力のテスト。
    #[rstest]
    #[case::no_unit("abc", 0.0)]
    #[case::number_only("42", 0.0)]
    #[case::unknown_unit("3x", 0.0)]
    #[case::leading_text("x3h", 0.0)]
    #[case::unit_without_count("h", 0.0)]
    #[case::space_between_count_and_unit("3 h", 0.0)]
    #[case::leading_space_before_hours(" 3h", 3.0)]
    #[case::leading_space_before_week(" 1w", 0.0)]
    #[case::reverse_order("3h 1w", 3.0)]
    #[case::repeated_unit("1d 3d", 8.0)]
    #[case::trailing_text("2h 30m later", 2.5)]
    #[case::stops_at_unknown("1d 2x 3h", 8.0)]
    #[case::uppercase_unit("2H", 0.0)]
    #[case::control_char_is_not_space("1w\u{1b}3d", 44.0)]
    fn test_parse_hours_malformed(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_hours(input), expected);
    }

    /// 同じ文字列は何度変換しても同じ値になる。
    #[test]
    fn test_parse_hours_is_stable() {
        let input = "1w 3d 2h 45m";

        assert_eq!(parse_hours(input), parse_hours(input));
    }

    /// 各単位の組み合わせが換算式と一致することを確認する。
    #[test]
    fn test_parse_hours_matches_weighted_sum() {
        for weeks in 0..3u32 {
            for days in 0..6u32 {
                for hours in 0..9u32 {
                    for minutes in (0..120u32).step_by(7) {
                        let input = format!("{}w {}d {}h {}m", weeks, days, hours, minutes);
                        let weighted_sum = f64::from(weeks) * HOURS_PER_WEEK
                            + f64::from(days) * HOURS_PER_DAY
                            + f64::from(hours)
                            + f64::from(minutes) / 60.0;
                        let expected = (weighted_sum * 100.0).round() / 100.0;

                        assert_eq!(parse_hours(&input), expected, "input: {}", input);
                    }
                }
            }
        }
    }

    /// 非常に長い数字でも失敗せず、負の値にならない。
    #[test]
    fn test_parse_hours_huge_count() {
        let input = format!("{}h", "9".repeat(400));

        assert!(parse_hours(&input) >= 0.0);
    }
}
