//! Conversion of an amount into one or more target currencies.
use crate::core::currency::{CurrencyCode, RateTable};
use crate::core::error::{Error, Result};
use tracing::debug;

/// Converts `amount` into every currency in `targets` using `rates`.
///
/// The output is positionally aligned with `targets`. A target missing from
/// the table yields `Error::RateUnavailable` for that entry alone. No rounding
/// is applied and the amount is not validated.
pub fn convert(amount: f64, rates: &RateTable, targets: &[CurrencyCode]) -> Vec<Result<f64>> {
    targets
        .iter()
        .map(|target| match rates.rate(target) {
            Some(rate) => {
                let converted = amount * rate;
                debug!(
                    "Converted {amount} from {} to {target} at rate {rate}: {converted}",
                    rates.base()
                );
                Ok(converted)
            }
            None => Err(Error::RateUnavailable {
                base: rates.base().clone(),
                target: target.clone(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn table() -> RateTable {
        RateTable::new(
            code("inr"),
            vec![(code("usd"), 0.012), (code("eur"), 0.011)],
        )
    }

    #[test]
    fn test_single_target() {
        for (amount, rate) in [(0.0, 2.5), (1.0, 0.5), (123.45, 80.0)] {
            let rates = RateTable::new(code("aaa"), vec![(code("bbb"), rate)]);
            let result = convert(amount, &rates, &[code("bbb")]);
            assert_eq!(result, vec![Ok(amount * rate)]);
        }
    }

    #[test]
    fn test_multiple_targets_keep_order_and_duplicates() {
        let targets = [code("eur"), code("usd"), code("eur")];
        let result = convert(100.0, &table(), &targets);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0], Ok(100.0 * 0.011));
        assert_eq!(result[1], Ok(100.0 * 0.012));
        assert_eq!(result[2], result[0]);
    }

    #[test]
    fn test_missing_rate_is_flagged_per_entry() {
        let targets = [code("usd"), code("jpy")];
        let result = convert(10.0, &table(), &targets);
        assert_eq!(result[0], Ok(10.0 * 0.012));
        assert_eq!(
            result[1],
            Err(Error::RateUnavailable {
                base: code("inr"),
                target: code("jpy"),
            })
        );
    }

    #[test]
    fn test_negative_amount_is_accepted() {
        let result = convert(-5.0, &table(), &[code("inr")]);
        assert_eq!(result, vec![Ok(-5.0)]);
    }

    #[test]
    fn test_full_precision_is_kept() {
        let result = convert(1.0 / 3.0, &table(), &[code("usd")]);
        assert_eq!(result, vec![Ok((1.0 / 3.0) * 0.012)]);
    }
}
