//! Reshape & emit (C5): groups per-bit assignments into their original
//! multi-bit variables, renders each group as lowercase hex, and serializes
//! the `{"assignment_list": [...]}` schema.

use serde::Serialize;

use crate::aag::VarPosition;
use crate::sample::Assignment;

/// One hex-rendered bit-group, matching the `{"value": "<hex>"}` schema.
#[derive(Serialize)]
pub struct Value {
    pub value: String,
}

/// The top-level JSON document: `{"assignment_list": [[{"value": ...}, ...], ...]}`.
#[derive(Serialize)]
pub struct Document {
    pub assignment_list: Vec<Vec<Value>>,
}

/// Width (in bits) of each group, indexed by group id, derived once from the
/// symbol table's positions: `width[x] = max(Y) + 1` observed for group `x`.
fn group_widths(positions: &[VarPosition]) -> Vec<u32> {
    let num_groups = positions.iter().map(|p| p.group + 1).max().unwrap_or(0) as usize;
    let mut widths = vec![0u32; num_groups];
    for p in positions {
        let w = &mut widths[p.group as usize];
        if p.bit + 1 > *w {
            *w = p.bit + 1;
        }
    }
    widths
}

/// Render a group's bits (indexed MSB-first within the group) as lowercase
/// hex: left-pad to a multiple of 4 bits, then strip leading zero nibbles,
/// always keeping at least one digit.
fn bits_to_hex(bits: &[bool]) -> String {
    let padded_width = (bits.len() + 3) / 4 * 4;
    let pad = padded_width - bits.len();

    let mut nibbles = Vec::with_capacity(padded_width / 4);
    let mut current = 0u8;
    let mut count = 0usize;
    for _ in 0..pad {
        current = current << 1;
        count += 1;
        if count == 4 {
            nibbles.push(current);
            current = 0;
            count = 0;
        }
    }
    for &b in bits {
        current = (current << 1) | (b as u8);
        count += 1;
        if count == 4 {
            nibbles.push(current);
            current = 0;
            count = 0;
        }
    }

    let hex: String = nibbles
        .iter()
        .map(|n| std::char::from_digit(*n as u32, 16).expect("nibble is 0..16"))
        .collect();
    let stripped = hex.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Group one assignment's bits by primary-input name and render each group
/// as hex, in ascending group-id order.
pub fn reshape_one(assignment: &Assignment, positions: &[VarPosition]) -> Vec<Value> {
    let widths = group_widths(positions);
    let mut groups: Vec<Vec<bool>> = widths.iter().map(|&w| vec![false; w as usize]).collect();

    for (input_index, &bit) in assignment.iter().enumerate() {
        let pos = positions[input_index];
        let width = widths[pos.group as usize];
        // bit Y sits at position width - 1 - Y when read MSB-first.
        let msb_index = (width - 1 - pos.bit) as usize;
        groups[pos.group as usize][msb_index] = bit;
    }

    groups
        .into_iter()
        .map(|bits| Value {
            value: bits_to_hex(&bits),
        })
        .collect()
}

/// Build the full output document from a set of assignments.
pub fn reshape(assignments: &[Assignment], positions: &[VarPosition]) -> Document {
    Document {
        assignment_list: assignments
            .iter()
            .map(|a| reshape_one(a, positions))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bit_group_renders_as_one_hex_digit() {
        let positions = vec![VarPosition { group: 0, bit: 0 }];
        let out = reshape_one(&vec![true], &positions);
        assert_eq!(out[0].value, "1");
        let out = reshape_one(&vec![false], &positions);
        assert_eq!(out[0].value, "0");
    }

    #[test]
    fn multi_bit_group_msb_first() {
        // var_0[0..3], value 0b0110 = 6, with bit 0 the LSB (var_0[0]=0).
        let positions = vec![
            VarPosition { group: 0, bit: 0 },
            VarPosition { group: 0, bit: 1 },
            VarPosition { group: 0, bit: 2 },
            VarPosition { group: 0, bit: 3 },
        ];
        // bits[i] assigned to primary input i; i3 i2 i1 i0 = 0 1 1 0
        let assignment = vec![false, true, true, false];
        let out = reshape_one(&assignment, &positions);
        assert_eq!(out[0].value, "6");
    }

    #[test]
    fn leading_zero_nibbles_are_stripped() {
        // 9 bits wide, value 1 -> pad to 12 bits -> strip to "1".
        let mut positions = Vec::new();
        for y in 0..9 {
            positions.push(VarPosition { group: 0, bit: y });
        }
        let mut assignment = vec![false; 9];
        assignment[8] = true; // bit 8 is the MSB (Y=8)
        let out = reshape_one(&assignment, &positions);
        assert_eq!(out[0].value, "1");
    }

    #[test]
    fn two_groups_ascending_order() {
        let positions = vec![
            VarPosition { group: 0, bit: 0 },
            VarPosition { group: 1, bit: 0 },
        ];
        let assignment = vec![true, false];
        let out = reshape_one(&assignment, &positions);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, "1");
        assert_eq!(out[1].value, "0");
    }
}
