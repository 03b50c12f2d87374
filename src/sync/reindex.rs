use crate::codec::{self, Position};
use crate::models::{FieldAttr, FieldDescriptor};
use crate::tree::ContentTree;

/// One attribute that changed during a normalize pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRewrite {
    /// Element id of the owning block or group item.
    pub scope: String,
    pub attr: FieldAttr,
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rewrites: Vec<FieldRewrite>,
    /// Non-empty fields without a positional pattern, left untouched.
    pub skipped: usize,
}

impl NormalizeReport {
    pub fn is_noop(&self) -> bool {
        self.rewrites.is_empty()
    }
}

/// Rewrite every field in the tree to match its current position.
///
/// Full pass over every block and item. Never fails: a field that does not carry
/// the expected pattern is counted and skipped.
pub fn normalize(tree: &mut ContentTree) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    for (b, block) in tree.blocks_mut().iter_mut().enumerate() {
        rewrite_fields(&block.id, &mut block.fields, Position::block(b), &mut report);

        if let Some(items) = block.items.as_mut() {
            for (s, item) in items.iter_mut().enumerate() {
                rewrite_fields(&item.id, &mut item.fields, Position::item(b, s), &mut report);
            }
        }
    }

    tracing::debug!(
        blocks = tree.len(),
        rewrites = report.rewrites.len(),
        skipped = report.skipped,
        "normalized field positions"
    );
    report
}

fn rewrite_fields(
    scope: &str,
    fields: &mut [FieldDescriptor],
    pos: Position,
    report: &mut NormalizeReport,
) {
    for field in fields.iter_mut() {
        let Some(next) = codec::rewrite(field.attr, &field.value, pos) else {
            if !field.value.is_empty() {
                tracing::trace!(scope, attr = %field.attr, value = %field.value, "not positional");
                report.skipped += 1;
            }
            continue;
        };

        if next == field.value {
            continue;
        }

        let from = std::mem::replace(&mut field.value, next.clone());
        report.rewrites.push(FieldRewrite {
            scope: scope.to_string(),
            attr: field.attr,
            from,
            to: next,
        });
    }
}
