//! AAG loader (C2): parses an And-Inverter-Graph text file, allocates one
//! BDD variable per primary input, folds every AND gate through the kernel,
//! and resolves the symbolic name of each input.

use regex::Regex;

use crate::bdd::{Edge, Manager};
use crate::error::{Result, SolGenError};

/// Where a primary input's name places it in the original multi-bit
/// variable layout. Names not matching `var_<X>[<Y>]` fall back to
/// `(input_index, 0)`, i.e. they are treated as single-bit variables.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VarPosition {
    pub group: u32,
    pub bit: u32,
}

/// The loaded circuit: one referenced output edge plus the per-input name
/// metadata the reshape stage (C5) needs.
pub struct Circuit {
    pub manager: Manager,
    pub output: Edge,
    pub num_inputs: usize,
    pub positions: Vec<VarPosition>,
}

fn name_pattern() -> Regex {
    Regex::new(r"^var_(\d+)\[(\d+)\]$").expect("static regex is valid")
}

/// Resolve an AAG literal to its edge, applying the complement tag if the
/// literal is odd. `table[k]` holds the edge for node `k` (`literal >> 1`);
/// literal `0`/`1` are the constants.
fn resolve(table: &[Option<Edge>], literal: u32, manager: &Manager) -> Result<Edge> {
    if literal == 0 {
        return Ok(Edge::ZERO);
    }
    if literal == 1 {
        return Ok(Edge::ONE);
    }
    let node = (literal >> 1) as usize;
    let edge = table
        .get(node)
        .and_then(|e| *e)
        .ok_or_else(|| SolGenError::Unsupported(format!("gate references undefined node {}", node)))?;
    Ok(if literal & 1 == 1 {
        manager.not(edge)
    } else {
        edge
    })
}

fn parse_u32(token: &str, context: &str) -> Result<u32> {
    token
        .parse::<u32>()
        .map_err(|_| SolGenError::BadFormat(format!("malformed integer in {}: {:?}", context, token)))
}

/// Load and build the BDD for an AAG file's single output.
pub fn load(text: &str) -> Result<Circuit> {
    let mut lines = text.lines();

    let header = lines
        .next()
        .ok_or_else(|| SolGenError::BadFormat("empty file".to_string()))?;
    let header_tokens: Vec<&str> = header.split_whitespace().collect();
    if header_tokens.len() != 6 || header_tokens[0] != "aag" {
        return Err(SolGenError::BadFormat(format!(
            "expected 'aag M I L O A' header, got {:?}",
            header
        )));
    }
    let max_index = parse_u32(header_tokens[1], "header")?;
    let num_inputs_hdr = parse_u32(header_tokens[2], "header")? as usize;
    let num_latches = parse_u32(header_tokens[3], "header")?;
    let num_outputs = parse_u32(header_tokens[4], "header")? as usize;
    let num_ands = parse_u32(header_tokens[5], "header")? as usize;

    if num_latches != 0 {
        return Err(SolGenError::Unsupported(format!(
            "L must be 0, got {}",
            num_latches
        )));
    }
    if num_outputs != 1 {
        return Err(SolGenError::Unsupported(format!(
            "O must be 1, got {}",
            num_outputs
        )));
    }

    let mut manager = Manager::new();
    // Dense edge table indexed by `literal >> 1`; index 0 is the unused
    // constant slot (literal 0/1 never resolve through it).
    let mut table: Vec<Option<Edge>> = vec![None; max_index as usize + 1];
    let mut input_literals: Vec<u32> = Vec::with_capacity(num_inputs_hdr);

    for _ in 0..num_inputs_hdr {
        let line = lines
            .next()
            .ok_or_else(|| SolGenError::BadFormat("truncated input section".to_string()))?;
        let literal = parse_u32(line.trim(), "input literal")?;
        if literal == 0 || literal & 1 != 0 {
            return Err(SolGenError::BadFormat(format!(
                "input literal must be even and >= 2, got {}",
                literal
            )));
        }
        let var_index = input_literals.len() as u32;
        let edge = manager.mk_var(var_index);
        let node = (literal >> 1) as usize;
        if node >= table.len() {
            return Err(SolGenError::BadFormat(format!(
                "input literal {} exceeds declared max index {}",
                literal, max_index
            )));
        }
        table[node] = Some(edge);
        input_literals.push(literal);
    }

    let mut output_literals: Vec<u32> = Vec::with_capacity(1);
    for _ in 0..num_outputs {
        let line = lines
            .next()
            .ok_or_else(|| SolGenError::BadFormat("truncated output section".to_string()))?;
        output_literals.push(parse_u32(line.trim(), "output literal")?);
    }

    manager.enable_autoreorder();
    for _ in 0..num_ands {
        let line = lines
            .next()
            .ok_or_else(|| SolGenError::BadFormat("truncated AND section".to_string()))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(SolGenError::BadFormat(format!(
                "AND gate must have 3 tokens, got {:?}",
                line
            )));
        }
        let out = parse_u32(tokens[0], "gate output literal")?;
        let in1 = parse_u32(tokens[1], "gate input literal")?;
        let in2 = parse_u32(tokens[2], "gate input literal")?;
        if out == 0 || out & 1 != 0 {
            return Err(SolGenError::BadFormat(format!(
                "gate output literal must be even and >= 2, got {}",
                out
            )));
        }
        let e1 = resolve(&table, in1, &manager)?;
        let e2 = resolve(&table, in2, &manager)?;
        let folded = manager.and(e1, e2);
        let node = (out >> 1) as usize;
        if node >= table.len() {
            return Err(SolGenError::BadFormat(format!(
                "gate output literal {} exceeds declared max index {}",
                out, max_index
            )));
        }
        table[node] = Some(folded);
    }
    manager.disable_autoreorder();

    let output = resolve(&table, output_literals[0], &manager)?;
    manager.ref_edge(output);

    log::info!(
        "parsed aag: {} inputs, {} gates, {} live bdd nodes",
        input_literals.len(),
        num_ands,
        manager.node_count()
    );

    let mut names: Vec<Option<String>> = vec![None; input_literals.len()];
    let mut has_symbol_table = false;
    for line in lines {
        if line.is_empty() || line == "c" {
            break;
        }
        if let Some(rest) = line.strip_prefix('i') {
            has_symbol_table = true;
            let mut parts = rest.splitn(2, ' ');
            let idx_str = parts
                .next()
                .ok_or_else(|| SolGenError::BadFormat(format!("malformed symbol line: {:?}", line)))?;
            let name = parts.next().unwrap_or("").to_string();
            let idx = parse_u32(idx_str, "symbol table index")? as usize;
            if idx < names.len() {
                names[idx] = Some(name);
            }
        }
        // `o<k> name` lines name the single output; not needed for reshaping.
    }
    if !has_symbol_table {
        log::warn!("no symbol table present; inputs get fallback names var_<k>[0]");
    }

    let pattern = name_pattern();
    let positions: Vec<VarPosition> = names
        .into_iter()
        .enumerate()
        .map(|(k, name)| match name {
            Some(n) => match pattern.captures(&n) {
                Some(caps) => VarPosition {
                    group: caps[1].parse().unwrap_or(k as u32),
                    bit: caps[2].parse().unwrap_or(0),
                },
                None => VarPosition {
                    group: k as u32,
                    bit: 0,
                },
            },
            None => VarPosition {
                group: k as u32,
                bit: 0,
            },
        })
        .collect();

    Ok(Circuit {
        manager,
        output,
        num_inputs: input_literals.len(),
        positions,
    })
}
