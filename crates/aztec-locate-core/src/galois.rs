//! Arithmetic over GF(2^m) and polynomials with coefficients in such a field.
//!
//! The mode message around the Aztec bull's-eye is protected by Reed-Solomon
//! over the 16-element field with primitive polynomial `x^4 + x + 1` (0x13),
//! so that field is the one constructor callers actually reach for.

use std::sync::Arc;

/// A finite field GF(2^m) with precomputed exp/log tables.
#[derive(Clone, Debug)]
pub struct GaloisField {
    size: u32,
    generator_base: u32,
    exp: Vec<u32>,
    log: Vec<u32>,
}

impl GaloisField {
    /// Build a field of the given size from its primitive polynomial.
    ///
    /// `generator_base` is the power of alpha at which the Reed-Solomon
    /// generator polynomial roots start (1 for the Aztec parameter field).
    pub fn new(primitive: u32, size: u32, generator_base: u32) -> Self {
        let mut exp = vec![0u32; size as usize];
        let mut log = vec![0u32; size as usize];
        let mut x = 1u32;
        for e in exp.iter_mut() {
            *e = x;
            x <<= 1;
            if x >= size {
                x ^= primitive;
                x &= size - 1;
            }
        }
        // log[0] stays 0 and must never be consulted.
        for (i, &e) in exp.iter().take(size as usize - 1).enumerate() {
            log[e as usize] = i as u32;
        }
        Self {
            size,
            generator_base,
            exp,
            log,
        }
    }

    /// GF(16) with primitive polynomial 0x13, the Aztec parameter field.
    pub fn aztec_param() -> Arc<Self> {
        Arc::new(Self::new(0x13, 16, 1))
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn generator_base(&self) -> u32 {
        self.generator_base
    }

    /// alpha^power.
    #[inline]
    pub fn exp(&self, power: u32) -> u32 {
        self.exp[power as usize]
    }

    /// Discrete logarithm of a nonzero element.
    #[inline]
    pub fn log(&self, value: u32) -> u32 {
        debug_assert!(value != 0);
        self.log[value as usize]
    }

    /// Multiplicative inverse of a nonzero element.
    #[inline]
    pub fn inverse(&self, value: u32) -> u32 {
        debug_assert!(value != 0);
        self.exp[(self.size - 1 - self.log[value as usize]) as usize]
    }

    /// Product of two field elements.
    #[inline]
    pub fn multiply(&self, a: u32, b: u32) -> u32 {
        if a == 0 || b == 0 {
            return 0;
        }
        let sum = self.log[a as usize] + self.log[b as usize];
        self.exp[(sum % (self.size - 1)) as usize]
    }
}

/// Addition and subtraction coincide in characteristic 2.
#[inline]
pub fn add(a: u32, b: u32) -> u32 {
    a ^ b
}

/// Polynomial over a [`GaloisField`], highest-degree coefficient first.
#[derive(Clone, Debug)]
pub(crate) struct GfPoly {
    field: Arc<GaloisField>,
    /// Never empty; leading coefficient nonzero unless the poly is zero.
    coefficients: Vec<u32>,
}

impl GfPoly {
    pub fn new(field: Arc<GaloisField>, coefficients: Vec<u32>) -> Self {
        debug_assert!(!coefficients.is_empty());
        let first_nonzero = coefficients.iter().position(|&c| c != 0);
        let coefficients = match first_nonzero {
            None => vec![0],
            Some(k) => coefficients[k..].to_vec(),
        };
        Self {
            field,
            coefficients,
        }
    }

    pub fn zero(field: Arc<GaloisField>) -> Self {
        Self {
            field,
            coefficients: vec![0],
        }
    }

    /// `coefficient * x^degree`.
    pub fn monomial(field: Arc<GaloisField>, degree: usize, coefficient: u32) -> Self {
        if coefficient == 0 {
            return Self::zero(field);
        }
        let mut coefficients = vec![0; degree + 1];
        coefficients[0] = coefficient;
        Self {
            field,
            coefficients,
        }
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coefficients[0] == 0
    }

    /// Coefficient of x^degree.
    pub fn coefficient(&self, degree: usize) -> u32 {
        self.coefficients[self.coefficients.len() - 1 - degree]
    }

    pub fn evaluate_at(&self, a: u32) -> u32 {
        if a == 0 {
            return self.coefficient(0);
        }
        if a == 1 {
            return self.coefficients.iter().fold(0, |acc, &c| add(acc, c));
        }
        let mut result = self.coefficients[0];
        for &c in &self.coefficients[1..] {
            result = add(self.field.multiply(a, result), c);
        }
        result
    }

    pub fn add_poly(&self, other: &GfPoly) -> GfPoly {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }

        let (smaller, larger) = if self.coefficients.len() <= other.coefficients.len() {
            (&self.coefficients, &other.coefficients)
        } else {
            (&other.coefficients, &self.coefficients)
        };
        let offset = larger.len() - smaller.len();

        let mut sum = larger[..offset].to_vec();
        for (i, &c) in smaller.iter().enumerate() {
            sum.push(add(c, larger[offset + i]));
        }
        GfPoly::new(self.field.clone(), sum)
    }

    pub fn multiply_poly(&self, other: &GfPoly) -> GfPoly {
        if self.is_zero() || other.is_zero() {
            return GfPoly::zero(self.field.clone());
        }
        let a = &self.coefficients;
        let b = &other.coefficients;
        let mut product = vec![0u32; a.len() + b.len() - 1];
        for (i, &ac) in a.iter().enumerate() {
            for (j, &bc) in b.iter().enumerate() {
                product[i + j] = add(product[i + j], self.field.multiply(ac, bc));
            }
        }
        GfPoly::new(self.field.clone(), product)
    }

    pub fn multiply_scalar(&self, scalar: u32) -> GfPoly {
        if scalar == 0 {
            return GfPoly::zero(self.field.clone());
        }
        if scalar == 1 {
            return self.clone();
        }
        let coefficients = self
            .coefficients
            .iter()
            .map(|&c| self.field.multiply(c, scalar))
            .collect();
        GfPoly::new(self.field.clone(), coefficients)
    }

    /// `self * coefficient * x^degree`.
    pub fn multiply_by_monomial(&self, degree: usize, coefficient: u32) -> GfPoly {
        if coefficient == 0 {
            return GfPoly::zero(self.field.clone());
        }
        let mut product: Vec<u32> = self
            .coefficients
            .iter()
            .map(|&c| self.field.multiply(c, coefficient))
            .collect();
        product.extend(std::iter::repeat(0).take(degree));
        GfPoly::new(self.field.clone(), product)
    }
}
