//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (the TUI reuses these strings verbatim)

use chrono::{DateTime, Local};

use crate::domain::{BreuschPaganTest, RainbowTest, VifEntry};
use crate::models::FittedModel;

/// Width of the summary table.
const WIDTH: usize = 78;

/// Format the full model summary: header statistics, coefficient table and
/// residual diagnostics.
pub fn format_summary(model: &FittedModel, rows_dropped: usize, generated_at: DateTime<Local>) -> String {
    let s = &model.stats;
    let m = &model.moments;
    let mut out = String::new();

    out.push_str(&format!("{:^width$}\n", "OLS Regression Results", width = WIDTH));
    out.push_str(&rule('='));
    push_pair(&mut out, "Dep. Variable:", &model.spec.target, "R-squared:", &fmt_num(s.r_squared));
    push_pair(&mut out, "Model:", "OLS", "Adj. R-squared:", &fmt_num(s.adj_r_squared));
    push_pair(&mut out, "Method:", "Least Squares", "F-statistic:", &fmt_num(s.f_statistic));
    push_pair(
        &mut out,
        "Date:",
        &generated_at.format("%a, %d %b %Y").to_string(),
        "Prob (F-statistic):",
        &fmt_num(s.f_p_value),
    );
    push_pair(
        &mut out,
        "Time:",
        &generated_at.format("%H:%M:%S").to_string(),
        "Log-Likelihood:",
        &fmt_num(s.log_likelihood),
    );
    push_pair(&mut out, "No. Observations:", &s.n_obs.to_string(), "AIC:", &fmt_num(s.aic));
    push_pair(&mut out, "Df Residuals:", &s.df_resid.to_string(), "BIC:", &fmt_num(s.bic));
    push_pair(&mut out, "Df Model:", &s.df_model.to_string(), "", "");
    if rows_dropped > 0 {
        push_pair(&mut out, "Rows Dropped:", &rows_dropped.to_string(), "", "");
    }
    out.push_str(&rule('='));

    out.push_str(&format!(
        "{:<16}{:>10}{:>10}{:>10}{:>10}{:>11}{:>11}\n",
        "", "coef", "std err", "t", "P>|t|", "[0.025", "0.975]"
    ));
    out.push_str(&rule('-'));
    for c in &model.coefficients {
        out.push_str(&format!(
            "{:<16}{:>10}{:>10}{:>10}{:>10}{:>11}{:>11}\n",
            truncate(&c.name, 15),
            fmt_num(c.estimate),
            fmt_num(c.std_error),
            fmt_num(c.t_value),
            fmt_num(c.p_value),
            fmt_num(c.ci_lower),
            fmt_num(c.ci_upper),
        ));
    }
    out.push_str(&rule('='));

    push_pair(&mut out, "Omnibus:", &fmt_num(m.omnibus), "Durbin-Watson:", &fmt_num(m.durbin_watson));
    push_pair(
        &mut out,
        "Prob(Omnibus):",
        &fmt_num(m.omnibus_p_value),
        "Jarque-Bera (JB):",
        &fmt_num(m.jarque_bera),
    );
    push_pair(&mut out, "Skew:", &fmt_num(m.skew), "Prob(JB):", &fmt_num(m.jarque_bera_p_value));
    push_pair(&mut out, "Kurtosis:", &fmt_num(m.kurtosis), "Cond. No.", &fmt_num(s.condition_number));
    out.push_str(&rule('='));
    out.push_str(&format!("Formula: {}\n", model.spec.formula()));

    out
}

/// Heading printed between the summary and the assumption checks.
pub fn format_checks_heading() -> String {
    "\n\nCheck Assumptions of Linear Regression\n".to_string()
}

/// Linearity block.
pub fn format_linearity(test: &RainbowTest) -> String {
    format!(
        "\nLinearity\nRainbow Statistic: {}\nRainbow p-value: {}\n",
        test.statistic, test.p_value
    )
}

/// Independence block: one row per feature, in model order, VIF first.
pub fn format_independence(vif: &[VifEntry]) -> String {
    let mut out = String::from("\n\nIndependence\n");
    out.push_str(&format!("{:>12}  {}\n", "VIF", "feature"));
    for v in vif {
        out.push_str(&format!("{:>12.6}  {}\n", v.vif, v.feature));
    }
    out
}

/// Homoscedasticity block.
pub fn format_homoscedasticity(test: &BreuschPaganTest) -> String {
    format!(
        "\n\nHomoscedasticity\nLagrange Multiplier p-value: {}\nF-statistic p-value: {}\n",
        test.lm_p_value, test.f_p_value
    )
}

fn push_pair(out: &mut String, l1: &str, v1: &str, l2: &str, v2: &str) {
    let line = format!("{l1:<18}{v1:>20}   {l2:<20}{v2:>17}");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn rule(ch: char) -> String {
    let mut s = ch.to_string().repeat(WIDTH);
    s.push('\n');
    s
}

/// Compact number formatting: fixed point for ordinary magnitudes,
/// scientific for very large or very small values.
pub fn fmt_num(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let a = v.abs();
    if a != 0.0 && !(1e-3..1e5).contains(&a) {
        format!("{v:.3e}")
    } else {
        format!("{v:.3}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
