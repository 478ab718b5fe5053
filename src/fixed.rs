#[cfg(test)]
#[path = "./fixed_test.rs"]
mod fixed_test;

use std::fmt;

/// 16:16 fixed point in sign-magnitude form: the top bit is the sign,
/// the lower 31 bits are the magnitude. This matches the arithmetic the
/// scaler and ray caster were written against, where negating is a
/// single bit flip and multiplication works on magnitudes.
#[derive(Eq, PartialEq, Clone, Copy)]
pub struct Fixed(u32);

const SIGN_BIT: u32 = 0x8000_0000;
const MAG_MASK: u32 = 0x7FFF_FFFF;

pub const ZERO: Fixed = Fixed(0);

pub fn new_fixed(int_part: i32, frac_part: i32) -> Fixed {
    let neg = int_part < 0;
    let mag = ((int_part.unsigned_abs() << 16) | (frac_part as u32 & 0xFFFF)) & MAG_MASK;
    if neg {
        Fixed(mag | SIGN_BIT)
    } else {
        Fixed(mag)
    }
}

pub fn new_fixed_u32(raw: u32) -> Fixed {
    Fixed(raw)
}

impl Fixed {
    pub fn to_u32(&self) -> u32 {
        self.0
    }

    pub fn magnitude(&self) -> u32 {
        self.0 & MAG_MASK
    }

    pub fn is_negative(&self) -> bool {
        self.0 & SIGN_BIT != 0
    }

    pub fn neg(self) -> Fixed {
        Fixed(self.0 ^ SIGN_BIT)
    }

    /// Sign-magnitude to two's complement.
    pub fn to_tc(&self) -> i32 {
        let mag = (self.0 & MAG_MASK) as i32;
        if self.is_negative() {
            -mag
        } else {
            mag
        }
    }
}

/// Two's complement to sign-magnitude. -0 never occurs, i32::MIN loses
/// its top magnitude bit (outside the representable range either way).
pub fn from_tc(v: i32) -> Fixed {
    if v < 0 {
        Fixed((v.unsigned_abs() & MAG_MASK) | SIGN_BIT)
    } else {
        Fixed(v as u32 & MAG_MASK)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}{}.{}", sign, self.magnitude() >> 16, self.magnitude() & 0xFFFF)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let i = self.magnitude() >> 16;
        let frac = self.magnitude() & 0xFFFF;
        write!(f, "{}{:#04x}.{:#04x}({}{}.{})", sign, i, frac, sign, i, frac)
    }
}

/// Multiply magnitudes in 64 bits, shift the binary point back, truncate
/// to 31 bits of magnitude, XOR the signs.
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let mag = ((a.magnitude() as u64 * b.magnitude() as u64) >> 16) as u32 & MAG_MASK;
    let sign = (a.0 ^ b.0) & SIGN_BIT;
    Fixed(mag | sign)
}

/// Add in two's complement with wrap-around, like the 16-bit originals did.
pub fn fixed_add(a: Fixed, b: Fixed) -> Fixed {
    from_tc(a.to_tc().wrapping_add(b.to_tc()))
}

/// Multiply a two's complement global coordinate by a sign-magnitude
/// table value, yielding two's complement. The workhorse of the view
/// transform.
pub fn fixed_mul_tc(a: i32, b: Fixed) -> i32 {
    fixed_mul(from_tc(a), b).to_tc()
}
