//! Dice roll expressions
//!
//! A [`RollExpr`] is the integer-producing expression handed to the host's
//! dice roller: die count and sides plus a numeric modifier, optionally
//! tagged with a damage type ("2d6 fire"). Ongoing-damage amounts are stored
//! as the string the user typed and parsed here when they are resolved.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid roll expression \"{expr}\"")]
pub struct RollExprError {
    pub expr: String,
}

/// A dice expression: `count`d`sides` + `modifier`, with an optional damage
/// type tag. A flat amount ("5") is count = 0 with the amount as modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
    pub tag: Option<String>,
}

/// Die rolled for saving throws.
pub const SAVE_DIE_SIDES: u32 = 20;

impl RollExpr {
    /// A saving throw: d20 plus the token's save bonus.
    pub fn save(bonus: i32) -> Self {
        Self {
            count: 1,
            sides: SAVE_DIE_SIDES,
            modifier: bonus,
            tag: None,
        }
    }

    /// Tag the expression with a damage type for announcement purposes.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Parse the dice notation the dialog accepts: "2d6", "d8", "1d6+2",
    /// "2d4-1", or a flat integer "5".
    pub fn parse(expr: &str) -> Result<Self, RollExprError> {
        let trimmed = expr.trim();
        let err = || RollExprError {
            expr: expr.to_string(),
        };
        if trimmed.is_empty() {
            return Err(err());
        }

        let Some((count_part, rest)) = trimmed.split_once(['d', 'D']) else {
            // Flat amount, no dice.
            let modifier = trimmed.parse::<i32>().map_err(|_| err())?;
            return Ok(Self {
                count: 0,
                sides: 0,
                modifier,
                tag: None,
            });
        };

        let count = if count_part.is_empty() {
            1
        } else {
            count_part.parse::<u32>().map_err(|_| err())?
        };

        let (sides_part, modifier) = match rest.find(['+', '-']) {
            Some(idx) => {
                let modifier = rest[idx..].parse::<i32>().map_err(|_| err())?;
                (&rest[..idx], modifier)
            }
            None => (rest, 0),
        };
        let sides = sides_part.parse::<u32>().map_err(|_| err())?;

        if count == 0 || sides == 0 {
            return Err(err());
        }

        Ok(Self {
            count,
            sides,
            modifier,
            tag: None,
        })
    }
}

impl fmt::Display for RollExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "{}", self.modifier)?;
        } else {
            write!(f, "{}d{}", self.count, self.sides)?;
            if self.modifier != 0 {
                write!(f, "{:+}", self.modifier)?;
            }
        }
        if let Some(tag) = &self.tag {
            write!(f, " {tag}")?;
        }
        Ok(())
    }
}
