//! Linear IL token scanning.
//!
//! The scanner classifies every opcode by its operand shape and collects the
//! 4-byte token operands it passes: method, field and type tokens feed the
//! reachability closure, and `ldstr` operands (the `0x70`-tagged `#US`
//! offsets) feed the user-string sweep. No control flow is followed; the
//! scan is a single left-to-right pass over the code bytes.
//!
//! The scanner is deliberately tolerant: an unknown opcode or a truncated
//! operand marks the scan as degenerate, advances one byte, and continues.
//! Tokens collected before the damage remain valid, and an iteration bound
//! guarantees termination on any input.

use crate::{assembly::opcodes, metadata::token::Token};

/// Operand shape of a CIL opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// No operand bytes
    None,
    /// One inline byte
    Byte,
    /// Two inline bytes
    Word,
    /// Four inline bytes
    DWord,
    /// Eight inline bytes
    QWord,
    /// A 4-byte metadata token
    Token,
    /// A 4-byte case count followed by that many 4-byte targets
    Switch,
}

/// Operand shape of a single-byte opcode, or `None` for undefined encodings.
#[must_use]
pub fn operand_kind(opcode: u8) -> Option<OperandKind> {
    use crate::assembly::opcodes::*;

    Some(match opcode {
        NOP..=0x0D => OperandKind::None,
        LDARG_S..=STLOC_S => OperandKind::Byte,
        0x14..=0x1E => OperandKind::None,
        LDC_I4_S => OperandKind::Byte,
        LDC_I4 | LDC_R4 => OperandKind::DWord,
        LDC_I8 | LDC_R8 => OperandKind::QWord,
        0x25 | 0x26 => OperandKind::None,
        JMP | CALL | CALLI => OperandKind::Token,
        RET => OperandKind::None,
        BR_S..=BLT_UN_S => OperandKind::Byte,
        BR..=BLT_UN => OperandKind::DWord,
        SWITCH => OperandKind::Switch,
        0x46..=0x6E => OperandKind::None,
        CALLVIRT | CPOBJ | LDOBJ | LDSTR | NEWOBJ | CASTCLASS | ISINST => OperandKind::Token,
        0x76 => OperandKind::None,
        UNBOX => OperandKind::Token,
        0x7A => OperandKind::None,
        LDFLD..=STOBJ => OperandKind::Token,
        0x82..=0x8B => OperandKind::None,
        BOX | NEWARR => OperandKind::Token,
        0x8E => OperandKind::None,
        LDELEMA => OperandKind::Token,
        0x90..=0xA2 => OperandKind::None,
        LDELEM | STELEM | UNBOX_ANY => OperandKind::Token,
        0xB3..=0xBA => OperandKind::None,
        REFANYVAL => OperandKind::Token,
        0xC3 => OperandKind::None,
        MKREFANY => OperandKind::Token,
        LDTOKEN => OperandKind::Token,
        0xD1..=0xDC => OperandKind::None,
        LEAVE => OperandKind::DWord,
        LEAVE_S => OperandKind::Byte,
        0xDF | CONV_U => OperandKind::None,
        _ => return None,
    })
}

/// Operand shape of a `0xFE`-prefixed opcode, or `None` for undefined
/// encodings.
#[must_use]
pub fn operand_kind_fe(opcode: u8) -> Option<OperandKind> {
    use crate::assembly::opcodes::*;

    Some(match opcode {
        FE_ARGLIST..=0x05 => OperandKind::None,
        FE_LDFTN | FE_LDVIRTFTN => OperandKind::Token,
        FE_LDARG..=FE_STLOC => OperandKind::Word,
        FE_LOCALLOC | FE_ENDFILTER => OperandKind::None,
        FE_UNALIGNED => OperandKind::Byte,
        FE_VOLATILE | FE_TAIL => OperandKind::None,
        FE_INITOBJ | FE_CONSTRAINED => OperandKind::Token,
        FE_CPBLK | FE_INITBLK => OperandKind::None,
        FE_NO => OperandKind::Byte,
        FE_RETHROW => OperandKind::None,
        FE_SIZEOF => OperandKind::Token,
        FE_REFANYTYPE | FE_READONLY => OperandKind::None,
        _ => return None,
    })
}

/// Result of scanning one IL stream.
#[derive(Debug, Default)]
pub struct TokenScan {
    /// Every 4-byte metadata token operand, in encounter order
    pub tokens: Vec<Token>,
    /// `#US` offsets from `ldstr` operands (the low 24 bits of the operand)
    pub user_strings: Vec<u32>,
    /// True when the stream contained an unknown opcode or was truncated
    pub degenerate: bool,
}

/// Scan an IL byte stream and collect its token operands.
#[must_use]
pub fn scan_tokens(code: &[u8]) -> TokenScan {
    let mut scan = TokenScan::default();
    let mut position = 0_usize;

    // Every path below advances by at least one byte; the bound is a last
    // line of defence against that invariant breaking
    let mut remaining_steps = code.len() + 1;

    while position < code.len() {
        if remaining_steps == 0 {
            scan.degenerate = true;
            break;
        }
        remaining_steps -= 1;

        let opcode = code[position];
        let (kind, operand_start) = if opcode == opcodes::FE_PREFIX {
            let Some(&second) = code.get(position + 1) else {
                scan.degenerate = true;
                break;
            };
            (operand_kind_fe(second), position + 2)
        } else {
            (operand_kind(opcode), position + 1)
        };

        let Some(kind) = kind else {
            scan.degenerate = true;
            position += 1;
            continue;
        };

        let operand_size = match kind {
            OperandKind::None => 0,
            OperandKind::Byte => 1,
            OperandKind::Word => 2,
            OperandKind::DWord | OperandKind::Token => 4,
            OperandKind::QWord => 8,
            OperandKind::Switch => {
                let Some(count_bytes) = code.get(operand_start..operand_start + 4) else {
                    scan.degenerate = true;
                    break;
                };
                let count = u32::from_le_bytes(count_bytes.try_into().unwrap_or_default()) as usize;

                match count.checked_mul(4).map(|targets| targets + 4) {
                    Some(total) if operand_start + total <= code.len() => total,
                    _ => {
                        scan.degenerate = true;
                        break;
                    }
                }
            }
        };

        if operand_start + operand_size > code.len() {
            scan.degenerate = true;
            break;
        }

        if kind == OperandKind::Token {
            let raw = u32::from_le_bytes(
                code[operand_start..operand_start + 4]
                    .try_into()
                    .unwrap_or_default(),
            );

            if opcode == opcodes::LDSTR {
                scan.user_strings.push(raw & 0x00FF_FFFF);
            } else {
                scan.tokens.push(Token::new(raw));
            }
        }

        position = operand_start + operand_size;
    }

    scan
}
