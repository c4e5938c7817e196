// src/ingest/rebase.rs
use crate::ingest::error::ExtractError;
use crate::ingest::types::RateTable;

/// Round to 4 decimal places; exact ties go to the even neighbour.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round_ties_even() / 10_000.0
}

/// Re-express a table whose values are quoted against `current_base` so that
/// they are quoted against `new_base`.
///
/// The `new_base` entry keeps its original value (how many units of
/// `new_base` buy one unit of `current_base`); every other entry becomes
/// `rates[new_base] / rates[c]`, rounded to 4 decimals.
pub fn rebase(
    current_base: &str,
    new_base: &str,
    rates: &RateTable,
) -> Result<RateTable, ExtractError> {
    let Some(&base_value) = rates.get(new_base) else {
        tracing::error!(
            current_base,
            new_base,
            known = rates.len(),
            "new base currency missing from rate table"
        );
        return Err(ExtractError::MissingBase {
            current_base: current_base.to_string(),
            new_base: new_base.to_string(),
        });
    };

    let mut out = RateTable::new();
    for (code, &rate) in rates {
        let value = if code == new_base {
            base_value
        } else {
            round4(base_value / rate)
        };
        if !value.is_finite() {
            tracing::warn!(current_base, new_base, code = %code, rate, "unusable rate skipped");
            continue;
        }
        out.insert(code.clone(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, f64)]) -> RateTable {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn new_base_keeps_value_others_divide() {
        let rates = table(&[("USD", 1.0), ("CAN", 2.0), ("USD2", 4.0)]);
        let out = rebase("USD", "CAN", &rates).unwrap();
        assert_eq!(out["CAN"], 2.0);
        assert_eq!(out["USD"], 2.0);
        assert_eq!(out["USD2"], 0.5);
    }

    #[test]
    fn results_rounded_to_four_places() {
        let rates = table(&[("A", 1.0), ("UAH", 2.0), ("C", 3.0)]);
        let out = rebase("A", "UAH", &rates).unwrap();
        assert_eq!(out["C"], 0.6667);
        assert_eq!(out["A"], 2.0);
        assert_eq!(out["UAH"], 2.0);
    }

    #[test]
    fn property_holds_for_every_key() {
        let rates = table(&[
            ("USD", 1.0),
            ("UAH", 41.3275),
            ("EUR", 0.9171),
            ("PLN", 3.9612),
            ("JPY", 149.87),
        ]);
        let out = rebase("USD", "UAH", &rates).unwrap();
        assert_eq!(out.len(), rates.len());
        for (code, rate) in &rates {
            if code == "UAH" {
                assert_eq!(out[code], rates["UAH"]);
            } else {
                assert_eq!(out[code], round4(rates["UAH"] / rate), "{code}");
            }
        }
    }

    #[test]
    fn exact_ties_round_to_even() {
        // 1/32 = 0.03125 and 3/32 = 0.09375 are exact in binary.
        let rates = table(&[("USD", 1.0), ("UAH", 1.0), ("X", 32.0)]);
        let out = rebase("USD", "UAH", &rates).unwrap();
        assert_eq!(out["X"], 0.0312);

        let rates = table(&[("USD", 1.0), ("UAH", 3.0), ("X", 32.0)]);
        let out = rebase("USD", "UAH", &rates).unwrap();
        assert_eq!(out["X"], 0.0938);
    }

    #[test]
    fn division_by_zero_rate_is_skipped() {
        let rates = table(&[("USD", 1.0), ("UAH", 41.0), ("XYZ", 0.0)]);
        let out = rebase("USD", "UAH", &rates).unwrap();
        assert!(!out.contains_key("XYZ"));
        assert_eq!(out["USD"], 41.0);
    }

    #[test]
    fn missing_new_base_is_an_error() {
        let rates = table(&[("USD", 1.0)]);
        let err = rebase("USD", "XYZ", &rates).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingBase { ref new_base, .. } if new_base == "XYZ"
        ));

        assert!(rebase("", "fakeNewBase", &RateTable::new()).is_err());
    }

    #[test]
    fn rebase_is_deterministic() {
        let rates = table(&[("USD", 1.0), ("UAH", 41.3275), ("EUR", 0.9171)]);
        let once = rebase("USD", "UAH", &rates).unwrap();
        let twice = rebase("USD", "UAH", &rates).unwrap();
        assert_eq!(once, twice);
    }
}
