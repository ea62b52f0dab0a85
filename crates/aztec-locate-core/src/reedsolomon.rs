//! Reed-Solomon correction and generation over a [`GaloisField`].
//!
//! The decoder corrects codewords in place: syndromes, then the extended
//! Euclidean algorithm for the error locator and evaluator, then a Chien
//! search over the (small) field and Forney magnitudes. Uncorrectable input
//! is an error; the detector folds it into its single not-found outcome.

use std::sync::Arc;

use crate::galois::{add, GaloisField, GfPoly};

/// Raised when a codeword block has more errors than the EC capacity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReedSolomonError {
    #[error("syndrome block does not resolve to an error locator")]
    BadLocator,
    #[error("error locator degree {degree} does not match {roots} roots")]
    LocatorDegreeMismatch { degree: usize, roots: usize },
    #[error("error position outside the codeword block")]
    BadPosition,
}

/// In-place Reed-Solomon decoder.
#[derive(Clone, Debug)]
pub struct ReedSolomonDecoder {
    field: Arc<GaloisField>,
}

impl ReedSolomonDecoder {
    pub fn new(field: Arc<GaloisField>) -> Self {
        Self { field }
    }

    /// Correct up to `ec_count / 2` codeword errors in `codewords`, the last
    /// `ec_count` of which are error-correction words.
    pub fn decode(&self, codewords: &mut [u32], ec_count: usize) -> Result<(), ReedSolomonError> {
        let field = &self.field;
        let poly = GfPoly::new(field.clone(), codewords.to_vec());

        let mut syndromes = vec![0u32; ec_count];
        let mut no_error = true;
        for (i, syndrome) in syndromes.iter_mut().enumerate() {
            let eval = poly.evaluate_at(field.exp(i as u32 + field.generator_base()));
            *syndrome = eval;
            if eval != 0 {
                no_error = false;
            }
        }
        if no_error {
            return Ok(());
        }
        syndromes.reverse();

        let syndrome_poly = GfPoly::new(field.clone(), syndromes);
        let (sigma, omega) = self.run_euclidean(
            GfPoly::monomial(field.clone(), ec_count, 1),
            syndrome_poly,
            ec_count,
        )?;

        let locations = self.find_error_locations(&sigma)?;
        let magnitudes = self.find_error_magnitudes(&omega, &locations);

        for (&location, &magnitude) in locations.iter().zip(magnitudes.iter()) {
            let log = field.log(location) as usize;
            if log + 1 > codewords.len() {
                return Err(ReedSolomonError::BadPosition);
            }
            let position = codewords.len() - 1 - log;
            codewords[position] = add(codewords[position], magnitude);
        }
        Ok(())
    }

    /// Extended Euclidean algorithm on `a = x^ec_count` and the syndrome
    /// polynomial, stopping once the remainder degree drops below
    /// `ec_count / 2`. Returns (error locator, error evaluator).
    fn run_euclidean(
        &self,
        a: GfPoly,
        b: GfPoly,
        ec_count: usize,
    ) -> Result<(GfPoly, GfPoly), ReedSolomonError> {
        let field = &self.field;
        let (mut r_last, mut r) = if a.degree() < b.degree() {
            (b, a)
        } else {
            (a, b)
        };
        let mut t_last = GfPoly::zero(field.clone());
        let mut t = GfPoly::monomial(field.clone(), 0, 1);

        while r.degree() >= ec_count / 2 {
            let r_last_last = r_last;
            let t_last_last = t_last;
            r_last = r;
            t_last = t;

            if r_last.is_zero() {
                // Euclidean algorithm already terminated.
                return Err(ReedSolomonError::BadLocator);
            }

            r = r_last_last;
            let mut q = GfPoly::zero(field.clone());
            let denominator_inverse = field.inverse(r_last.coefficient(r_last.degree()));
            while r.degree() >= r_last.degree() && !r.is_zero() {
                let degree_diff = r.degree() - r_last.degree();
                let scale = field.multiply(r.coefficient(r.degree()), denominator_inverse);
                q = q.add_poly(&GfPoly::monomial(field.clone(), degree_diff, scale));
                r = r.add_poly(&r_last.multiply_by_monomial(degree_diff, scale));
            }

            t = q.multiply_poly(&t_last).add_poly(&t_last_last);

            if r.degree() >= r_last.degree() {
                return Err(ReedSolomonError::BadLocator);
            }
        }

        let sigma_tilde_at_zero = t.coefficient(0);
        if sigma_tilde_at_zero == 0 {
            return Err(ReedSolomonError::BadLocator);
        }
        let inverse = field.inverse(sigma_tilde_at_zero);
        Ok((t.multiply_scalar(inverse), r.multiply_scalar(inverse)))
    }

    /// Chien search: the field is small, so try every nonzero element.
    fn find_error_locations(&self, sigma: &GfPoly) -> Result<Vec<u32>, ReedSolomonError> {
        let num_errors = sigma.degree();
        if num_errors == 1 {
            return Ok(vec![sigma.coefficient(1)]);
        }
        let field = &self.field;
        let mut locations = Vec::with_capacity(num_errors);
        for i in 1..field.size() {
            if locations.len() >= num_errors {
                break;
            }
            if sigma.evaluate_at(i) == 0 {
                locations.push(field.inverse(i));
            }
        }
        if locations.len() != num_errors {
            return Err(ReedSolomonError::LocatorDegreeMismatch {
                degree: num_errors,
                roots: locations.len(),
            });
        }
        Ok(locations)
    }

    /// Forney formula for the magnitude at each error location.
    fn find_error_magnitudes(&self, omega: &GfPoly, locations: &[u32]) -> Vec<u32> {
        let field = &self.field;
        let mut magnitudes = Vec::with_capacity(locations.len());
        for (i, &location) in locations.iter().enumerate() {
            let xi_inverse = field.inverse(location);
            let mut denominator = 1u32;
            for (j, &other) in locations.iter().enumerate() {
                if i != j {
                    denominator =
                        field.multiply(denominator, add(1, field.multiply(other, xi_inverse)));
                }
            }
            let mut magnitude =
                field.multiply(omega.evaluate_at(xi_inverse), field.inverse(denominator));
            if field.generator_base() != 0 {
                magnitude = field.multiply(magnitude, xi_inverse);
            }
            magnitudes.push(magnitude);
        }
        magnitudes
    }
}

/// Appends EC codewords to a data block; the synthetic-code test support and
/// the decoder round-trip tests both need the generating side.
#[derive(Clone, Debug)]
pub struct ReedSolomonEncoder {
    field: Arc<GaloisField>,
}

impl ReedSolomonEncoder {
    pub fn new(field: Arc<GaloisField>) -> Self {
        Self { field }
    }

    /// Fill the last `ec_count` entries of `codewords` with the EC words for
    /// the leading data words.
    pub fn encode(&self, codewords: &mut [u32], ec_count: usize) {
        debug_assert!(ec_count > 0 && ec_count < codewords.len());
        let field = &self.field;

        // Generator: product of (x - alpha^(base + i)).
        let mut generator = GfPoly::monomial(field.clone(), 0, 1);
        for i in 0..ec_count as u32 {
            let root = GfPoly::new(
                field.clone(),
                vec![1, field.exp(i + field.generator_base())],
            );
            generator = generator.multiply_poly(&root);
        }

        let data_count = codewords.len() - ec_count;
        let info = GfPoly::new(field.clone(), codewords[..data_count].to_vec())
            .multiply_by_monomial(ec_count, 1);
        let remainder = poly_remainder(&info, &generator, field);

        for c in codewords[data_count..].iter_mut() {
            *c = 0;
        }
        let num_coeffs = remainder.degree() + 1;
        if !remainder.is_zero() {
            for d in 0..num_coeffs {
                codewords[codewords.len() - 1 - d] = remainder.coefficient(d);
            }
        }
    }
}

fn poly_remainder(dividend: &GfPoly, divisor: &GfPoly, field: &Arc<GaloisField>) -> GfPoly {
    let mut remainder = dividend.clone();
    let denominator_inverse = field.inverse(divisor.coefficient(divisor.degree()));
    while remainder.degree() >= divisor.degree() && !remainder.is_zero() {
        let degree_diff = remainder.degree() - divisor.degree();
        let scale = field.multiply(
            remainder.coefficient(remainder.degree()),
            denominator_inverse,
        );
        remainder = remainder.add_poly(&divisor.multiply_by_monomial(degree_diff, scale));
    }
    remainder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(data: &[u32], ec_count: usize, corrupt: &[usize]) -> Result<Vec<u32>, ReedSolomonError> {
        let field = GaloisField::aztec_param();
        let mut codewords = data.to_vec();
        codewords.extend(std::iter::repeat(0).take(ec_count));
        ReedSolomonEncoder::new(field.clone()).encode(&mut codewords, ec_count);

        let clean = codewords.clone();
        for &i in corrupt {
            codewords[i] ^= 0x5;
        }
        ReedSolomonDecoder::new(field).decode(&mut codewords, ec_count)?;
        assert_eq!(codewords, clean);
        Ok(codewords)
    }

    #[test]
    fn clean_block_passes_untouched() {
        round_trip(&[0xA, 0x3], 5, &[]).expect("no errors");
    }

    #[test]
    fn corrects_single_error_in_compact_parameters() {
        // Compact mode message: 2 data + 5 EC codewords.
        round_trip(&[0xA, 0x3], 5, &[1]).expect("one error");
    }

    #[test]
    fn corrects_two_errors_in_full_parameters() {
        // Full mode message: 4 data + 6 EC codewords.
        round_trip(&[0x1, 0xF, 0x0, 0x7], 6, &[0, 5]).expect("two errors");
    }

    #[test]
    fn rejects_too_many_errors() {
        // 5 EC words correct at most 2 errors; 4 flips must not decode to
        // the original block.
        let field = GaloisField::aztec_param();
        let mut codewords = vec![0xA, 0x3, 0, 0, 0, 0, 0];
        ReedSolomonEncoder::new(field.clone()).encode(&mut codewords, 5);
        let clean = codewords.clone();
        for i in 0..4 {
            codewords[i] ^= 0x9;
        }
        let result = ReedSolomonDecoder::new(field).decode(&mut codewords, 5);
        assert!(result.is_err() || codewords != clean);
    }

    #[test]
    fn encoder_matches_decoder_syndromes() {
        let field = GaloisField::aztec_param();
        let mut codewords = vec![0x7, 0x2, 0xC, 0x1, 0, 0, 0, 0, 0, 0];
        ReedSolomonEncoder::new(field.clone()).encode(&mut codewords, 6);

        // Every generator root must be a root of the full codeword poly.
        let poly = GfPoly::new(field.clone(), codewords.clone());
        for i in 0..6 {
            assert_eq!(poly.evaluate_at(field.exp(i + field.generator_base())), 0);
        }
    }
}
