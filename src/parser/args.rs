//! Argument-list parsing and call/prototype alignment
//! (spec §4.2 "Call arguments", "Argument application (`ApplyCallArguments`)").

use codemap::{Span, Spanned};

use crate::ast::expr::{Argument, ArgumentList, CallArgs, CallArgument, Expr};
use crate::error::SassResult;
use crate::parser::Parser;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// Parses a mixin/function declaration's parameter list:
    /// `($name: default, $rest...)`.
    pub(crate) fn parse_argument_list(&mut self) -> SassResult<ArgumentList> {
        self.expect_char('(')?;
        let mut args = Vec::new();
        if self.peek_is_char(')') {
            self.bump();
            return Ok(ArgumentList(args));
        }
        loop {
            let tok = self.expect(TokenKind::Variable, "expected a parameter name")?;
            let is_variadic = if self.peek_is_str("...") {
                self.bump();
                self.bump();
                self.bump();
                true
            } else {
                false
            };
            let default = if !is_variadic && self.peek_is_char(':') {
                self.bump();
                Some(self.parse_space_list_pub()?)
            } else {
                None
            };
            args.push(Argument {
                name: tok.text,
                default,
                is_variadic,
            });
            if self.peek_is_char(',') {
                self.bump();
                if self.peek_is_char(')') {
                    break;
                }
                continue;
            }
            break;
        }
        self.expect_char(')')?;
        Ok(ArgumentList(args))
    }

    /// Exposed so `parse_argument_list` can reuse the expression parser's
    /// (private) space-list production for parameter defaults.
    fn parse_space_list_pub(&mut self) -> SassResult<Spanned<Expr>> {
        self.parse_expr()
    }
}

/// Align a call-site argument list to a prototype's parameter list
/// (spec §4.2 "Argument application (`ApplyCallArguments`)").
///
/// Every returned `CallArgument` corresponds 1:1, in order, to
/// `proto.0`; `spec.md` §8 calls this "argument application conservation".
pub(crate) fn apply_call_arguments(
    proto: &ArgumentList,
    call: &CallArgs,
    span: Span,
) -> SassResult<CallArgs> {
    if call.has_named() && call.has_variadic() {
        return Err(("named arguments and a spread argument cannot be combined in the same call", span).into());
    }

    let mut positional: Vec<Spanned<Expr>> = Vec::new();
    let mut named: Vec<(String, Spanned<Expr>)> = Vec::new();
    let mut spread: Option<Spanned<Expr>> = None;

    for arg in &call.0 {
        if arg.is_variadic {
            spread = Some(arg.value.clone());
        } else if let Some(name) = &arg.name {
            named.push((name.clone(), arg.value.clone()));
        } else {
            positional.push(arg.value.clone());
        }
    }

    let mut out = Vec::with_capacity(proto.0.len());

    for (idx, param) in proto.0.iter().enumerate() {
        if param.is_variadic {
            if let Some(spread_val) = &spread {
                // lazily index into the spread list: ListSlice from the
                // current positional count onward.
                out.push(CallArgument {
                    name: None,
                    value: Spanned {
                        node: Expr::ListSlice {
                            variable: spread_variable_name(spread_val),
                            from_index: positional.len() as i64,
                        },
                        span,
                    },
                    is_variadic: false,
                });
            } else {
                let tail: Vec<Spanned<Expr>> = positional.split_off(idx.min(positional.len()));
                out.push(CallArgument {
                    name: None,
                    value: Spanned {
                        node: Expr::List {
                            sep: crate::common::ListSeparator::Space,
                            brackets: crate::common::Brackets::None,
                            items: tail,
                        },
                        span,
                    },
                    is_variadic: false,
                });
            }
            continue;
        }

        if let Some(value) = positional.get(idx).cloned() {
            out.push(CallArgument {
                name: None,
                value,
                is_variadic: false,
            });
            continue;
        }

        if let Some(spread_val) = &spread {
            // literal positional args bind first; the spread only fills
            // parameters beyond what was given positionally.
            out.push(CallArgument {
                name: None,
                value: Spanned {
                    node: Expr::ListLookup {
                        variable: spread_variable_name(spread_val),
                        index: (idx - positional.len()) as i64,
                    },
                    span,
                },
                is_variadic: false,
            });
            continue;
        }

        let normalized = crate::scope::normalize(&param.name);
        if let Some((_, value)) = named
            .iter()
            .find(|(n, _)| crate::scope::normalize(n) == normalized)
        {
            out.push(CallArgument {
                name: None,
                value: value.clone(),
                is_variadic: false,
            });
            continue;
        }

        if let Some(default) = &param.default {
            out.push(CallArgument {
                name: None,
                value: default.clone(),
                is_variadic: false,
            });
            continue;
        }

        return Err((format!("Missing argument ${}.", param.name), span).into());
    }

    Ok(CallArgs(out))
}

/// A spread argument (`$list...`) is only legal as a bare variable
/// reference at the call site (spec §4.2); recover its name for the
/// `ListLookup`/`ListSlice` indirection used above.
fn spread_variable_name(value: &Spanned<Expr>) -> String {
    match &value.node {
        Expr::Variable(name) => name.clone(),
        _ => String::new(),
    }
}
