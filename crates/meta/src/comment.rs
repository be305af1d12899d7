/// Message posted on a pull request after its commit has been scored.
///
/// `score01` is the raw analysis score in `[0, 1]`; it is shown on the 0-100
/// scale with two decimals.
pub fn score_comment(commit_id: &str, score01: f64) -> String {
    format!("reportcard score for commit {commit_id} is: {:.2}", score01 * 100.0)
}
