//! Versioned message programs.

use serde::{Deserialize, Serialize};
use snowbridge_planner_primitives::{registry::Parachain, topic::MessageId};

use crate::{
    errors::{BuilderError, BuilderResult},
    instruction::Instruction,
};

/// Revision of the message format a program is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum XcmVersion {
    /// Version 4.
    V4,

    /// Version 5, adding `PayFees`, `SetHints` and `InitiateTransfer`.
    V5,
}

impl XcmVersion {
    /// The newest version the given parachain executes, as reported by the registry.
    pub const fn for_parachain(parachain: &Parachain) -> Self {
        if parachain.supports_v5() {
            XcmVersion::V5
        } else {
            XcmVersion::V4
        }
    }

    /// The numeric version.
    pub const fn number(self) -> u8 {
        match self {
            XcmVersion::V4 => 4,
            XcmVersion::V5 => 5,
        }
    }
}

/// An ordered instruction list tagged with its format version.
///
/// Construction checks that every instruction, nested ones included, exists in the version and
/// that the program ends with a `SetTopic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Program {
    version: XcmVersion,
    instructions: Vec<Instruction>,
}

impl Program {
    /// Creates a program, validating it against `version`.
    pub fn new(version: XcmVersion, instructions: Vec<Instruction>) -> BuilderResult<Self> {
        check_version(&instructions, version)?;
        if !matches!(instructions.last(), Some(Instruction::SetTopic(_))) {
            return Err(BuilderError::MissingTopic);
        }

        Ok(Self {
            version,
            instructions,
        })
    }

    /// Returns this program with `prefix` prepended.
    pub fn with_prefix(self, prefix: Vec<Instruction>) -> BuilderResult<Self> {
        let mut instructions = prefix;
        instructions.extend(self.instructions);
        Self::new(self.version, instructions)
    }

    /// The format version.
    pub const fn version(&self) -> XcmVersion {
        self.version
    }

    /// The instructions, in execution order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consumes the program, returning its instructions.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// The correlation topic the program ends with.
    pub fn topic(&self) -> Option<MessageId> {
        match self.instructions.last() {
            Some(Instruction::SetTopic(topic)) => Some(*topic),
            _ => None,
        }
    }

    /// The last top-level instruction that hands assets to another chain, if any.
    pub fn forwarding(&self) -> Option<&Instruction> {
        self.instructions.iter().rev().find(|i| i.is_forwarding())
    }

    /// Whether a refund path precedes the last forwarding instruction.
    ///
    /// Programs that never leave the executing chain trivially satisfy this.
    pub fn has_refund_before_forwarding(&self) -> bool {
        match self.instructions.iter().rposition(Instruction::is_forwarding) {
            Some(idx) => self.instructions[..idx]
                .iter()
                .any(Instruction::is_refund_path),
            None => true,
        }
    }

    /// Number of top-level instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the program has no instructions. Never true for a constructed program.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

fn check_version(instructions: &[Instruction], version: XcmVersion) -> BuilderResult<()> {
    for instruction in instructions {
        if instruction.min_version() > version {
            return Err(BuilderError::UnsupportedInstruction {
                instruction: instruction.name(),
                version,
            });
        }
        if let Some(nested) = instruction.nested() {
            check_version(nested, version)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_primitives::location::{parachain_location, Location};

    use super::*;
    use crate::instruction::{AssetFilter, Hint};

    fn topic() -> Instruction {
        Instruction::SetTopic(MessageId::new([7; 32]))
    }

    #[test]
    fn test_program_requires_topic() {
        assert_eq!(
            Program::new(XcmVersion::V4, vec![Instruction::ClearOrigin]),
            Err(BuilderError::MissingTopic)
        );
        assert_eq!(
            Program::new(XcmVersion::V4, Vec::new()),
            Err(BuilderError::MissingTopic)
        );

        let program =
            Program::new(XcmVersion::V4, vec![Instruction::ClearOrigin, topic()]).unwrap();
        assert_eq!(program.topic(), Some(MessageId::new([7; 32])));
    }

    #[test]
    fn test_v4_rejects_nested_v5_instruction() {
        let appendix = Instruction::SetAppendix(vec![Instruction::SetHints(Vec::new())]);

        let err = Program::new(XcmVersion::V4, vec![appendix.clone(), topic()]).unwrap_err();

        assert_eq!(
            err,
            BuilderError::UnsupportedInstruction {
                instruction: "SetHints",
                version: XcmVersion::V4,
            }
        );
        assert!(Program::new(XcmVersion::V5, vec![appendix, topic()]).is_ok());
    }

    #[test]
    fn test_refund_before_forwarding() {
        let forward = Instruction::DepositReserveAsset {
            assets: AssetFilter::all_counted(2),
            dest: parachain_location(2030),
            xcm: vec![topic()],
        };
        let claimer = Instruction::SetHints(vec![Hint::AssetClaimer {
            location: Location::here(),
        }]);

        let unsafe_program =
            Program::new(XcmVersion::V5, vec![forward.clone(), claimer.clone(), topic()]).unwrap();
        let safe_program = Program::new(XcmVersion::V5, vec![claimer, forward, topic()]).unwrap();
        let local = Program::new(XcmVersion::V4, vec![Instruction::ClearOrigin, topic()]).unwrap();

        assert!(!unsafe_program.has_refund_before_forwarding());
        assert!(safe_program.has_refund_before_forwarding());
        assert!(local.has_refund_before_forwarding());
        assert!(local.forwarding().is_none());
    }

    #[test]
    fn test_program_json_round_trip() {
        let program = Program::new(
            XcmVersion::V5,
            vec![
                Instruction::SetHints(vec![Hint::AssetClaimer {
                    location: parachain_location(1000),
                }]),
                topic(),
            ],
        )
        .unwrap();

        let json = serde_json::to_string(&program).unwrap();
        let decoded: Program = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, program);
    }
}
