use crate::dom::{Document, ElementSpec, NodeId};
use std::fmt;
use tether_types::{Error, Result};

/// where a patch lands, resolved against the document at apply time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Target {
    Node(NodeId),
    Id(String),
    Class(String),
    /// first descendant of the node carrying the class.
    Within(NodeId, String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Node(node) => write!(f, "{:?}", node),
            Target::Id(id) => write!(f, "#{}", id),
            Target::Class(class) => write!(f, ".{}", class),
            Target::Within(node, class) => write!(f, "{:?} .{}", node, class),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UiPatch {
    Append { parent: Target, element: ElementSpec },
    /// no-op when nothing matches.
    Remove(Target),
    /// drops `from`, adds `to`.
    SwapClass { target: Target, from: String, to: String },
    SetText { target: Target, text: String },
    SetValue { target: Target, value: String },
    SetDisabled { target: Target, disabled: bool },
    ResetForm(Target),
}

impl Document {
    pub(crate) fn resolve(&self, target: &Target) -> Option<NodeId> {
        match target {
            Target::Node(node) => Some(*node),
            Target::Id(id) => self.by_id(id),
            Target::Class(class) => self.first_by_class(class),
            Target::Within(node, class) => self.find_within(*node, class),
        }
    }

    pub(crate) fn apply(&mut self, patch: &UiPatch) -> Result<()> {
        if let UiPatch::Remove(target) = patch {
            if let Some(node) = self.resolve(target) {
                self.remove(node);
            }
            return Ok(());
        }
        let target = match patch {
            UiPatch::Append { parent, .. } => parent,
            UiPatch::SwapClass { target, .. }
            | UiPatch::SetText { target, .. }
            | UiPatch::SetValue { target, .. }
            | UiPatch::SetDisabled { target, .. }
            | UiPatch::ResetForm(target)
            | UiPatch::Remove(target) => target,
        };
        let node = self
            .resolve(target)
            .ok_or_else(|| Error::MissingElement(target.to_string()))?;
        match patch {
            UiPatch::Append { element, .. } => {
                let added = self.append(node, element.clone());
                log::debug!("appended {}", self.to_html(added));
            }
            UiPatch::SwapClass { from, to, .. } => self.swap_class(node, from, to),
            UiPatch::SetText { text, .. } => self.set_text(node, text.clone()),
            UiPatch::SetValue { value, .. } => self.set_attr(node, "value", value.clone()),
            UiPatch::SetDisabled { disabled: true, .. } => self.set_attr(node, "disabled", ""),
            UiPatch::SetDisabled { disabled: false, .. } => self.remove_attr(node, "disabled"),
            UiPatch::ResetForm(_) => self.reset_form(node),
            UiPatch::Remove(_) => {}
        }
        Ok(())
    }

    /// applies in order, keeps going past failures and reports the first.
    pub(crate) fn apply_all(&mut self, patches: &[UiPatch]) -> Result<()> {
        let mut first_err = None;
        for patch in patches {
            if let Err(e) = self.apply(patch) {
                log::warn!("patch {:?} not applied: {}", patch, e);
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Target, UiPatch};
    use crate::dom::{Document, ElementSpec};
    use tether_types::Error;

    #[test]
    fn remove_missing_is_noop() {
        let mut doc = Document::new();
        assert!(doc.apply(&UiPatch::Remove(Target::Id("nope".to_string()))).is_ok());
    }

    #[test]
    fn missing_target_reports_selector() {
        let mut doc = Document::new();
        let err = doc
            .apply(&UiPatch::SetText {
                target: Target::Class("rating-sum".to_string()),
                text: "1".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, Error::MissingElement(".rating-sum".to_string()));
    }

    #[test]
    fn swap_keeps_other_classes() {
        let mut doc = Document::new();
        let root = doc.root();
        let btn = doc.append(root, ElementSpec::new("button").class("btn btn-primary"));
        let swap = UiPatch::SwapClass {
            target: Target::Node(btn),
            from: "btn-primary".to_string(),
            to: "btn-danger".to_string(),
        };
        doc.apply(&swap).unwrap();
        assert_eq!(doc.classes(btn), ["btn", "btn-danger"]);
        doc.apply(&swap).unwrap();
        assert_eq!(doc.classes(btn), ["btn", "btn-danger"]);
    }

    #[test]
    fn disable_round_trip() {
        let mut doc = Document::new();
        let root = doc.root();
        let btn = doc.append(root, ElementSpec::new("button"));
        let target = Target::Node(btn);
        doc.apply(&UiPatch::SetDisabled {
            target: target.clone(),
            disabled: true,
        })
        .unwrap();
        assert!(doc.is_disabled(btn));
        doc.apply(&UiPatch::SetDisabled { target, disabled: false }).unwrap();
        assert!(!doc.is_disabled(btn));
    }

    #[test]
    fn apply_all_continues_after_failure() {
        let mut doc = Document::new();
        let root = doc.root();
        let patches = vec![
            UiPatch::Append {
                parent: Target::Id("missing".to_string()),
                element: ElementSpec::new("p"),
            },
            UiPatch::Append {
                parent: Target::Node(root),
                element: ElementSpec::new("p").id("kept"),
            },
        ];
        assert!(doc.apply_all(&patches).is_err());
        assert!(doc.by_id("kept").is_some());
    }
}
