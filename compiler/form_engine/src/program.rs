//! Rule strings compiled once at load time.
//!
//! Every condition, action and `init` string in the schema is parsed into a
//! single shared [`ExprArena`]. Write targets are split into field key and
//! attribute here, against the declared key set, so the cascade never has
//! to re-parse or re-match a path.

use std::collections::BTreeSet;

use form_eval::{match_field, References};
use form_ir::{
    CallSpec, ConditionalAction, ExprArena, ExprId, FieldAttr, Instruction, Path, ResultBinding,
    Target,
};
use form_parse::{parse_expression, parse_instruction, ParseError};
use rustc_hash::FxHashSet;

use crate::schema::{FieldDef, RuleDef};
use crate::store::FieldStore;
use crate::{FormError, FormResult};

/// Where a write lands.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum WriteTarget {
    Field { idx: usize, attr: FieldAttr },
    Temp(String),
    /// Resolved at load, reported each time the action runs.
    Invalid(FormError),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Binding {
    Discard,
    Temp { name: String, projection: Path },
    Field { target: WriteTarget, projection: Path },
    Multi(Vec<(WriteTarget, Path)>),
}

/// A lowered instruction.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    Set { target: WriteTarget, value: ExprId },
    Clear { target: WriteTarget },
    Call { call: CallSpec, bind: Binding },
    Conditional {
        branches: Vec<(ExprId, Op)>,
        otherwise: Option<Box<Op>>,
    },
}

/// One action plus the string it came from, for error messages.
#[derive(Clone, Debug)]
pub(crate) struct Action {
    pub source: String,
    pub op: Op,
}

#[derive(Clone, Debug)]
pub(crate) struct Condition {
    pub source: String,
    pub expr: ExprId,
}

/// `if`/`elif` arm. A missing condition always holds.
#[derive(Clone, Debug)]
pub(crate) struct Branch {
    pub condition: Option<Condition>,
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug)]
pub(crate) struct Rule {
    /// The `then` arm followed by every `elif` arm.
    pub branches: Vec<Branch>,
    pub otherwise: Option<Vec<Action>>,
    pub init: Vec<Action>,
}

/// Compiled rules for every field, indexed like the field store.
#[derive(Clone, Debug, Default)]
pub(crate) struct Program {
    pub arena: ExprArena,
    pub rules: Vec<Vec<Rule>>,
    /// Paths each field's conditions and actions read (not `init`).
    ///
    /// A read of a temp bound by an earlier action of the same field is
    /// left out; every other path is kept, even when some rule elsewhere
    /// binds a temp of the same name.
    pub reads: Vec<References>,
    /// Fields each field's conditions and actions may write (not `init`),
    /// ascending, self excluded.
    pub writes: Vec<Vec<usize>>,
}

/// What one field's rules read and write, collected in source order.
#[derive(Default)]
struct FieldScan {
    reads: References,
    writes: BTreeSet<usize>,
    /// Temps bound by earlier unconditional actions of the branch being
    /// compiled.
    bound: FxHashSet<String>,
}

impl FieldScan {
    /// Keep the reads of `refs` that do not name an already-bound temp.
    fn absorb(&mut self, refs: References) {
        let bound = &self.bound;
        self.reads.paths.extend(refs.paths.into_iter().filter(|path| {
            !path
                .segments()
                .first()
                .is_some_and(|head| bound.contains(head))
        }));
        self.reads.calls.extend(refs.calls);
    }

    /// Record the write targets of a lowered op. Temps only count as bound
    /// when `binds` is set, i.e. the op is sure to run once reached.
    fn record(&mut self, op: &Op, binds: bool) {
        match op {
            Op::Set { target, .. } | Op::Clear { target } => self.record_target(target, binds),
            Op::Call { bind, .. } => match bind {
                Binding::Discard => {}
                Binding::Temp { name, .. } => {
                    if binds {
                        self.bound.insert(name.clone());
                    }
                }
                Binding::Field { target, .. } => self.record_target(target, binds),
                Binding::Multi(entries) => {
                    for (target, _) in entries {
                        self.record_target(target, binds);
                    }
                }
            },
            Op::Conditional {
                branches,
                otherwise,
            } => {
                for (_, op) in branches {
                    self.record(op, false);
                }
                if let Some(op) = otherwise {
                    self.record(op, false);
                }
            }
        }
    }

    fn record_target(&mut self, target: &WriteTarget, binds: bool) {
        match target {
            WriteTarget::Field { idx, .. } => {
                self.writes.insert(*idx);
            }
            WriteTarget::Temp(name) if binds => {
                self.bound.insert(name.clone());
            }
            WriteTarget::Temp(_) | WriteTarget::Invalid(_) => {}
        }
    }
}

impl Program {
    pub(crate) fn compile(defs: &[FieldDef], store: &FieldStore, sep: &str) -> FormResult<Self> {
        let mut compiler = Compiler {
            program: Program::default(),
            store,
            sep,
        };
        for (idx, def) in defs.iter().enumerate() {
            let mut scan = FieldScan::default();
            let mut rules = Vec::with_capacity(def.rules.len());
            for rule in &def.rules {
                rules.push(compiler.rule(&def.key, rule, &mut scan)?);
            }
            scan.writes.remove(&idx);
            compiler.program.rules.push(rules);
            compiler.program.reads.push(scan.reads);
            compiler.program.writes.push(scan.writes.into_iter().collect());
        }
        Ok(compiler.program)
    }
}

struct Compiler<'a> {
    program: Program,
    store: &'a FieldStore,
    sep: &'a str,
}

impl Compiler<'_> {
    fn rule(&mut self, key: &str, def: &RuleDef, scan: &mut FieldScan) -> FormResult<Rule> {
        // A temp bound inside one arm is unbound again for the next arm.
        // Only an unconditional `then` keeps its temps for later rules.
        let outer = scan.bound.clone();
        let mut after = None;
        let mut branches = Vec::with_capacity(1 + def.elif.len());
        let arms = std::iter::once((def.condition.as_deref(), &def.then))
            .chain(def.elif.iter().map(|elif| (elif.condition.as_deref(), &elif.then)));
        for (condition, then) in arms {
            let condition = self.condition(key, condition, scan)?;
            let actions = self.actions(key, then, Some(&mut *scan))?;
            if branches.is_empty() && condition.is_none() {
                after = Some(scan.bound.clone());
            }
            scan.bound.clone_from(&outer);
            branches.push(Branch { condition, actions });
        }
        let otherwise = match &def.otherwise {
            Some(actions) => Some(self.actions(key, actions, Some(&mut *scan))?),
            None => None,
        };
        scan.bound = after.unwrap_or(outer);
        let init = self.actions(key, &def.init, None)?;
        Ok(Rule {
            branches,
            otherwise,
            init,
        })
    }

    fn condition(
        &mut self,
        key: &str,
        source: Option<&str>,
        scan: &mut FieldScan,
    ) -> FormResult<Option<Condition>> {
        let Some(source) = source.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let expr = parse_expression(source, &mut self.program.arena)
            .map_err(|err| syntax_error(key, source, &err))?;
        let mut refs = References::new();
        refs.scan_expr(&self.program.arena, expr);
        scan.absorb(refs);
        Ok(Some(Condition {
            source: source.to_string(),
            expr,
        }))
    }

    /// `scan` is `None` for `init` lists, which never create graph edges.
    fn actions(
        &mut self,
        key: &str,
        sources: &[String],
        mut scan: Option<&mut FieldScan>,
    ) -> FormResult<Vec<Action>> {
        let mut actions = Vec::with_capacity(sources.len());
        for source in sources {
            let instruction = parse_instruction(source, &mut self.program.arena)
                .map_err(|err| syntax_error(key, source, &err))?;
            let mut refs = References::new();
            refs.scan_instruction(&self.program.arena, &instruction);
            let op = self.lower(instruction);
            if let Some(scan) = scan.as_deref_mut() {
                scan.absorb(refs);
                scan.record(&op, true);
            }
            actions.push(Action {
                source: source.clone(),
                op,
            });
        }
        Ok(actions)
    }

    fn lower(&self, instruction: Instruction) -> Op {
        match instruction {
            Instruction::Set { target, value } => Op::Set {
                target: self.target(&target, false),
                value,
            },
            Instruction::Clear { target } => Op::Clear {
                target: self.target(&target, false),
            },
            Instruction::CallMethod { call, bind } => {
                let bind = match bind {
                    None => Binding::Discard,
                    Some(ResultBinding::Field { projection, target }) => {
                        match self.target(&target, true) {
                            WriteTarget::Temp(name) => Binding::Temp { name, projection },
                            target => Binding::Field { target, projection },
                        }
                    }
                    Some(ResultBinding::Multi(entries)) => Binding::Multi(
                        entries
                            .into_iter()
                            .map(|(target, source)| (self.target(&target, false), source))
                            .collect(),
                    ),
                };
                Op::Call { call, bind }
            }
            Instruction::CallMethodToTemp { temp, call } => Op::Call {
                    call,
                    bind: Binding::Temp {
                        name: temp,
                        projection: Path::new(),
                    },
                },
            Instruction::Conditional(ConditionalAction {
                branches,
                otherwise,
            }) => Op::Conditional {
                branches: branches
                    .into_iter()
                    .map(|branch| (branch.condition, self.lower(*branch.action)))
                    .collect(),
                otherwise: otherwise.map(|action| Box::new(self.lower(*action))),
            },
        }
    }

    /// Split a target path into field key and attribute.
    ///
    /// With `allow_temp`, a single segment naming no field binds a temp.
    fn target(&self, target: &Target, allow_temp: bool) -> WriteTarget {
        let segments = target.path.segments();
        let store = self.store;
        let Some(found) = match_field(segments, self.sep, |key| store.contains(key)) else {
            if allow_temp {
                if let [name] = segments {
                    return WriteTarget::Temp(name.clone());
                }
            }
            return WriteTarget::Invalid(FormError::UnknownField(self.undeclared_key(segments)));
        };

        if found.rest < segments.len() {
            // `app.name.colour` or `app.name.value.x`
            let start = found.rest - usize::from(found.attr.is_some());
            return WriteTarget::Invalid(FormError::InvalidAttribute {
                key: found.key,
                attr: segments[start..].join("."),
            });
        }
        let attr = found.attr.unwrap_or(FieldAttr::Value);
        if !attr.is_writable() {
            return WriteTarget::Invalid(FormError::InvalidAttribute {
                key: found.key,
                attr: attr.as_str().to_string(),
            });
        }
        match self.store.index_of(&found.key) {
            Some(idx) => WriteTarget::Field { idx, attr },
            None => WriteTarget::Invalid(FormError::UnknownField(found.key)),
        }
    }

    /// Key part of an unmatched target: the path minus a trailing attribute.
    fn undeclared_key(&self, segments: &[String]) -> String {
        match segments.split_last() {
            Some((last, head)) if !head.is_empty() && FieldAttr::from_name(last).is_some() => {
                head.join(self.sep)
            }
            _ => segments.join(self.sep),
        }
    }
}

fn syntax_error(key: &str, source: &str, err: &ParseError) -> FormError {
    FormError::Schema(format!("field `{key}`: syntax error in `{source}`: {err}"))
}
