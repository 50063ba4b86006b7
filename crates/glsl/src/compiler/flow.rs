use crate::error::{Location, Result, bail};

/// Open `if`/`else` blocks, innermost last.
///
/// A block closes when evaluation reaches its end index. An `elif` chain is never
/// flattened: the `if` of the next branch opens inside the `else` of the previous one.
#[derive(Debug, Default)]
pub(super) struct BlockStack {
    blocks: Vec<Block>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockKind {
    If,
    Else,
}

#[derive(Clone, Copy, Debug)]
struct Block {
    kind: BlockKind,
    end: usize,
}

/// What an unconditional jump turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Jump {
    /// A jump to the next instruction.
    Fallthrough,
    /// The end of an `if` body, the `else` body follows.
    Else,
}

impl BlockStack {
    /// Indentation of the statements at the current position. The function body is depth 1.
    pub fn depth(&self) -> usize {
        1 + self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Open an `if` block at `at` that ends at `target`.
    pub fn open(&mut self, at: usize, target: usize, len: usize) -> Result<()> {
        self.check_forward(at, target, len)?;
        self.blocks.push(Block {
            kind: BlockKind::If,
            end: target,
        });
        Ok(())
    }

    pub fn jump(&mut self, at: usize, target: usize, len: usize) -> Result<Jump> {
        if target == at + 1 {
            return Ok(Jump::Fallthrough);
        }

        if target <= at {
            bail!(
                UnsupportedInstruction,
                Location::Instruction(at),
                "backward jump to #{}, loops are not supported",
                target
            );
        }

        let parent_end = self.parent_end(1);
        let Some(block) = self.blocks.last_mut() else {
            bail!(
                MalformedControlFlow,
                Location::Instruction(at),
                "jump to #{} outside of a conditional block",
                target
            );
        };

        if block.kind != BlockKind::If || block.end != at + 1 {
            bail!(
                MalformedControlFlow,
                Location::Instruction(at),
                "jump to #{} does not end an `if` body",
                target
            );
        }

        if target > parent_end.unwrap_or(len) {
            bail!(
                MalformedControlFlow,
                Location::Instruction(at),
                "`else` body ending at #{} escapes its enclosing block",
                target
            );
        }

        block.kind = BlockKind::Else;
        block.end = target;
        Ok(Jump::Else)
    }

    /// Pop the innermost block if it ends at `at`.
    pub fn close(&mut self, at: usize) -> bool {
        match self.blocks.last() {
            Some(block) if block.end == at => {
                self.blocks.pop();
                true
            }
            _ => false,
        }
    }

    fn check_forward(&self, at: usize, target: usize, len: usize) -> Result<()> {
        if target <= at {
            bail!(
                UnsupportedInstruction,
                Location::Instruction(at),
                "backward branch to #{}, loops are not supported",
                target
            );
        }

        if target > self.parent_end(0).unwrap_or(len) {
            bail!(
                MalformedControlFlow,
                Location::Instruction(at),
                "branch target #{} escapes its enclosing block",
                target
            );
        }

        Ok(())
    }

    /// End of the block `skip` levels above the innermost one.
    fn parent_end(&self, skip: usize) -> Option<usize> {
        self.blocks.iter().rev().nth(skip).map(|block| block.end)
    }
}
