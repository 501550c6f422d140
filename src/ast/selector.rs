use codemap::Span;

use crate::ast::expr::Expr;
use crate::common::Combinator;
use crate::error::SassResult;

/// One simple selector (spec §3). `Interpolation` carries the already-lexed
/// inner expression; it's resolved to literal text during statement
/// execution, at which point the selector tree contains only the other
/// variants.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SimpleSelector {
    Type(String),
    Universal,
    Class(String),
    Id(String),
    Attribute {
        name: String,
        op: Option<String>,
        value: Option<String>,
    },
    Pseudo(String),
    FunctionalPseudo {
        name: String,
        args: String,
    },
    Parent,
    Interpolation(Box<Expr>),
}

/// A non-empty, ordered run of simple selectors sharing no combinator
/// (spec GLOSSARY "Compound selector").
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CompoundSelector(pub Vec<SimpleSelector>);

impl CompoundSelector {
    pub fn new() -> Self {
        CompoundSelector(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with_parent(&self) -> bool {
        matches!(self.0.first(), Some(SimpleSelector::Parent))
    }

    pub fn append(&mut self, tail: &[SimpleSelector]) {
        self.0.extend_from_slice(tail);
    }
}

/// One item of a complex selector: an optional leading combinator paired
/// with an optional compound (spec §3 -- exactly one of the two is absent
/// only at the edges produced by the parent-join algorithm).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComplexSelectorItem {
    pub combinator: Option<Combinator>,
    pub compound: Option<CompoundSelector>,
}

/// Sequence of compound selectors joined by combinators
/// (spec GLOSSARY "Complex selector").
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ComplexSelector(pub Vec<ComplexSelectorItem>);

impl ComplexSelector {
    pub fn new() -> Self {
        ComplexSelector(Vec::new())
    }

    pub fn from_compound(compound: CompoundSelector) -> Self {
        ComplexSelector(vec![ComplexSelectorItem {
            combinator: None,
            compound: Some(compound),
        }])
    }

    pub fn to_css_string(&self) -> String {
        let mut out = String::new();
        for (i, item) in self.0.iter().enumerate() {
            // A selector never opens with a combinator in CSS output; any
            // combinator recorded on the first item is bookkeeping left
            // over from `join_selectors`' uniform processing, not something
            // to render.
            if i > 0 {
                match item.combinator {
                    Some(comb) => out.push_str(comb.as_str()),
                    None => out.push(' '),
                }
            }
            if let Some(compound) = &item.compound {
                for simple in &compound.0 {
                    out.push_str(&simple_to_css(simple));
                }
            }
        }
        out
    }
}

fn simple_to_css(s: &SimpleSelector) -> String {
    match s {
        SimpleSelector::Type(name) => name.clone(),
        SimpleSelector::Universal => "*".to_owned(),
        SimpleSelector::Class(name) => format!(".{}", name),
        SimpleSelector::Id(name) => format!("#{}", name),
        SimpleSelector::Attribute { name, op, value } => match (op, value) {
            (Some(op), Some(value)) => format!("[{}{}{}]", name, op, value),
            _ => format!("[{}]", name),
        },
        SimpleSelector::Pseudo(name) => format!(":{}", name),
        SimpleSelector::FunctionalPseudo { name, args } => format!(":{}({})", name, args),
        SimpleSelector::Parent => "&".to_owned(),
        SimpleSelector::Interpolation(_) => String::new(),
    }
}

/// Comma-separated list of complex selectors (spec GLOSSARY "Selector list").
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ComplexSelectorList(pub Vec<ComplexSelector>);

impl ComplexSelectorList {
    pub fn new() -> Self {
        ComplexSelectorList(Vec::new())
    }

    pub fn to_css_string(&self) -> String {
        self.0
            .iter()
            .map(ComplexSelector::to_css_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Merge `parent` and `child` using the parent-selector join algorithm
/// (spec §4.6), grounded on `original_source/ast/complex_selector.go`.
pub(crate) fn join_selectors(
    parent: &ComplexSelector,
    child: &ComplexSelector,
    span: Span,
) -> SassResult<ComplexSelector> {
    // Flatten: treat the child's leading compound as an item with an
    // implicit descendant combinator so every item can be processed
    // uniformly.
    let mut child_items = Vec::with_capacity(child.0.len());
    for (i, item) in child.0.iter().enumerate() {
        if i == 0 && item.combinator.is_none() {
            child_items.push(ComplexSelectorItem {
                combinator: Some(Combinator::Descendant),
                compound: item.compound.clone(),
            });
        } else {
            child_items.push(item.clone());
        }
    }

    let mut out_items: Vec<ComplexSelectorItem> = Vec::new();
    let mut parent_found = false;

    for item in &child_items {
        let compound = match &item.compound {
            Some(c) if !c.is_empty() => c,
            _ => continue,
        };

        if !compound.starts_with_parent() {
            out_items.push(item.clone());
            continue;
        }

        parent_found = true;

        let mut parent_copy = parent.clone();
        let tail = &compound.0[1..];
        if let Some(last) = parent_copy.0.last_mut() {
            if let Some(c) = &mut last.compound {
                c.append(tail);
            } else {
                last.compound = Some(CompoundSelector(tail.to_vec()));
            }
        }

        if let Some(first) = parent_copy.0.first_mut() {
            // the first item of the parent copy inherits the child item's
            // own combinator, since it is now the join point.
            if out_items.is_empty() {
                first.combinator = item.combinator;
            }
        }

        out_items.extend(parent_copy.0);
    }

    if !parent_found {
        // the parent's own leading combinator (if any, from a previous join)
        // and the child's leading combinator cannot both be present.
        if let (Some(p_last), Some(c_first)) = (parent.0.last(), child.0.first()) {
            if p_last.combinator.is_some() && c_first.combinator.is_some() {
                return Err(
                    ("cannot join selectors: both sides supply a combinator", span).into(),
                );
            }
        }

        let mut out = parent.clone();
        out.0.extend(child.0.iter().cloned());
        return Ok(out);
    }

    if out_items.is_empty() {
        return Err(("child selector cannot contain zero items", span).into());
    }

    Ok(ComplexSelector(out_items))
}

/// Cartesian join of two selector lists (spec §4.6 step 3).
pub(crate) fn join_selector_lists(
    parent: &ComplexSelectorList,
    child: &ComplexSelectorList,
    span: Span,
) -> SassResult<ComplexSelectorList> {
    let mut out = Vec::with_capacity(parent.0.len() * child.0.len());
    for p in &parent.0 {
        for c in &child.0 {
            out.push(join_selectors(p, c, span)?);
        }
    }
    Ok(ComplexSelectorList(out))
}
