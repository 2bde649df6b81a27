//! Smoothed two-sided margin loss
//!
//! For a robustness constant c > 0 and threshold θ = c / (1 + c):
//!
//! ```text
//! loss_p(u) = 1 - u                        u <  θ
//!           = 1 / ((1+c)² u + (1 - c²))    u >= θ
//! loss_m(u) = loss_p(-u)
//! ```
//!
//! Both branches meet at θ with value 1/(1+c) and slope -1, so the loss is
//! continuously differentiable. All constants derived from c are computed
//! once in `MarginLoss::new`.

use crate::core::{ABCError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginLoss {
    c: f64,
    thres: f64,
    // (1+c)², 1-c²: value branch
    v1: f64,
    v2: f64,
    // 1+c, 1-c: derivative branch
    d1: f64,
    d2: f64,
}

impl MarginLoss {
    /// Create the loss for robustness constant `c`
    ///
    /// # Errors
    /// Returns `InvalidParameter` unless c is finite and positive
    pub fn new(c: f64) -> Result<Self> {
        if !(c.is_finite() && c > 0.0) {
            return Err(ABCError::InvalidParameter(format!(
                "Robustness constant must be positive and finite, got {c}"
            )));
        }
        Ok(Self {
            c,
            thres: c / (1.0 + c),
            v1: (1.0 + c) * (1.0 + c),
            v2: 1.0 - c * c,
            d1: 1.0 + c,
            d2: 1.0 - c,
        })
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    /// Junction point θ = c / (1 + c)
    pub fn threshold(&self) -> f64 {
        self.thres
    }

    /// Loss for a sample whose target is the positive side
    #[inline]
    pub fn loss_p(&self, u: f64) -> f64 {
        if u >= self.thres {
            self.rational_p(u)
        } else {
            1.0 - u
        }
    }

    /// Loss for a sample whose target is the negative side
    #[inline]
    pub fn loss_m(&self, u: f64) -> f64 {
        if -u >= self.thres {
            self.rational_m(u)
        } else {
            1.0 + u
        }
    }

    /// d loss_p / du
    #[inline]
    pub fn dloss_p(&self, u: f64) -> f64 {
        if u >= self.thres {
            self.drational_p(u)
        } else {
            -1.0
        }
    }

    /// d loss_m / du
    #[inline]
    pub fn dloss_m(&self, u: f64) -> f64 {
        if -u >= self.thres {
            self.drational_m(u)
        } else {
            1.0
        }
    }

    /// Loss selected by the sign of the response weight
    #[inline]
    pub fn loss(&self, resp: f64, u: f64) -> f64 {
        if resp > 0.0 {
            self.loss_p(u)
        } else {
            self.loss_m(u)
        }
    }

    /// Derivative selected by the sign of the response weight
    #[inline]
    pub fn dloss(&self, resp: f64, u: f64) -> f64 {
        if resp > 0.0 {
            self.dloss_p(u)
        } else {
            self.dloss_m(u)
        }
    }

    fn rational_p(&self, u: f64) -> f64 {
        1.0 / (self.v1 * u + self.v2)
    }

    fn rational_m(&self, u: f64) -> f64 {
        1.0 / (self.v2 - self.v1 * u)
    }

    fn drational_p(&self, u: f64) -> f64 {
        -(self.d1 * u + self.d2).powi(-2)
    }

    fn drational_m(&self, u: f64) -> f64 {
        (self.d2 - self.d1 * u).powi(-2)
    }
}
