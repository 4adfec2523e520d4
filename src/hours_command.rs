use log::info;

use crate::duration;

/// `hours`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct HoursArgs {
    #[clap(
        required = true,
        help = "Estimates to convert, e.g. \"1w 3d 2h 45m\" (1w = 44h, 1d = 8h)"
    )]
    estimates: Vec<String>,
}

/// 見積もり文字列と換算した時間。
#[derive(Clone, Debug, PartialEq)]
pub struct Estimate {
    pub input: String,
    pub hours: f64,
}

/// `hours`サブコマンドの処理を行う。
///
/// 指定された見積もり文字列をそれぞれ時間に換算する。
/// 単位を読み取れない文字列は0時間になる。
///
/// # Arguments
///
/// * `hours` - `hours`サブコマンドの引数
pub fn hours_command(hours: HoursArgs) -> Vec<Estimate> {
    let estimates: Vec<Estimate> = hours
        .estimates
        .into_iter()
        .map(|input| {
            let hours = duration::parse_hours(&input);
            Estimate { input, hours }
        })
        .collect();
    info!("{} estimates converted.", estimates.len());

    estimates
}

#[cfg(test)]
mod tests {
    use super::{hours_command, Estimate, HoursArgs};

    #[test]
    fn test_hours_command() {
        let args = HoursArgs {
            estimates: vec!["1w 3d 2h 45m".to_string(), "later".to_string()],
        };

        let result = hours_command(args);

        assert_eq!(
            result,
            vec![
                Estimate {
                    input: "1w 3d 2h 45m".to_string(),
                    hours: 70.75,
                },
                Estimate {
                    input: "later".to_string(),
                    hours: 0.0,
                },
            ]
        );
    }
}
