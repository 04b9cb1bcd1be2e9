//! Pattern compiler.
//!
//! Turns an ordered rule table into one combined, anchored matcher. Every
//! rule becomes a named capture group (its dispatch marker) inside a single
//! alternation; the catch-all for unknown input is appended last:
//!
//! ```text
//! (?P<T_NUMBER>(?:\d+))|(?P<A0>(?:\s+))|...|(?P<T_UNKNOWN>(?s-u:.+?))
//! ```
//!
//! Alternation is leftmost-first, so among rules that match at the same
//! offset the earliest-declared one wins even when a later one would match
//! more input.
//!
//! Each rule is also parsed on its own before the combined pattern is
//! built. That attributes syntax errors to the offending rule and yields
//! the rule's own capture count, which the executor needs to find the
//! rule's sub-groups inside the combined match.

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use lexr_core::RuleId;
use regex_automata::meta;
use regex_automata::util::captures::Captures;
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input, MatchKind, PatternID};
use regex_syntax::hir::{Hir, HirKind};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::aliases::{is_valid_marker, OrderedGenerator};
use crate::config::CompileOptions;
use crate::error::CompilationError;
use crate::state::TokenDefinition;

/// Matches exactly one byte of anything, lazily extended by the engine only
/// as far as needed. Appended after every rule.
const CATCH_ALL: &str = "(?s-u:.+?)";

/// Compiles rule tables under a fixed set of [`CompileOptions`].
#[derive(Clone, Debug, Default)]
pub struct PatternCompiler {
    options: CompileOptions,
}

impl PatternCompiler {
    pub fn new(options: CompileOptions) -> Self {
        PatternCompiler { options }
    }

    /// Build the combined matcher for `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`CompilationError`] when a rule has an empty or reserved
    /// name, is declared twice, has a malformed pattern, or when the
    /// combined pattern cannot be built.
    #[tracing::instrument(level = "debug", skip_all, fields(rules = rules.len()))]
    pub fn compile(&self, rules: &[TokenDefinition]) -> Result<CompiledMatcher, CompilationError> {
        let mut declared = FxHashSet::default();
        let mut parsed = Vec::with_capacity(rules.len());
        for rule in rules {
            check_identifier(rule)?;
            if !declared.insert(&rule.id) {
                return Err(CompilationError::duplicate_rule(&rule.id));
            }
            let hir = self
                .parser()
                .parse(&rule.pattern)
                .map_err(|err| CompilationError::invalid_pattern(&rule.id, &err))?;
            parsed.push((rule, hir));
        }

        // Rule markers and the rules' own group names share one namespace
        // in the combined pattern.
        let markers: FxHashSet<&str> = rules
            .iter()
            .filter_map(|rule| rule.id.as_name())
            .filter(|name| is_valid_marker(name))
            .chain([RuleId::UNKNOWN_NAME])
            .collect();
        let mut groups: FxHashSet<&str> = FxHashSet::default();
        for (rule, hir) in &parsed {
            let mut names = Vec::new();
            capture_names(hir, &mut names);
            for name in names {
                if markers.contains(name) || !groups.insert(name) {
                    return Err(CompilationError::group_name_clash(&rule.id, name));
                }
            }
        }
        let mut taken: FxHashSet<String> = markers
            .iter()
            .chain(&groups)
            .map(|&name| name.to_owned())
            .collect();
        taken.extend(
            rules
                .iter()
                .filter_map(|rule| rule.id.as_name())
                .map(str::to_owned),
        );

        let mut generator = OrderedGenerator::new(self.options.alias_prefix.as_str());
        let mut aliases = FxHashMap::default();
        let mut marked = Vec::with_capacity(parsed.len());
        let mut pattern = String::new();

        for (rule, hir) in parsed {
            let marker = match rule.id.as_name() {
                Some(name) if is_valid_marker(name) => name.to_owned(),
                _ => {
                    let alias = generator.generate(&taken);
                    trace!(rule = %rule.id, %alias, "aliased marker");
                    aliases.insert(alias.clone().into_boxed_str(), rule.id.clone());
                    alias
                }
            };

            pattern.push_str("(?P<");
            pattern.push_str(&marker);
            pattern.push_str(">(?:");
            pattern.push_str(&rule.pattern);
            pattern.push_str("))|");
            marked.push((rule.id.clone(), marker, hir));
        }

        pattern.push_str("(?P<");
        pattern.push_str(RuleId::UNKNOWN_NAME);
        pattern.push('>');
        pattern.push_str(CATCH_ALL);
        pattern.push(')');
        trace!(%pattern, "combined pattern");

        let regex = meta::Builder::new()
            .configure(meta_config())
            .syntax(self.syntax_config())
            .build(&pattern)
            .map_err(|err| CompilationError::combined_build(&err))?;

        let info = regex.group_info();
        let group_of = |name: &str| {
            info.to_index(PatternID::ZERO, name).ok_or_else(|| {
                CompilationError::combined(format_args!("marker group {name} is missing"))
            })
        };

        let mut compiled = Vec::with_capacity(marked.len());
        for (id, marker, hir) in marked {
            let group = group_of(&marker)?;
            let group_names = (1..=hir.properties().explicit_captures_len())
                .map(|inner| info.to_name(PatternID::ZERO, group + inner).map(Arc::from))
                .collect();
            compiled.push(CompiledRule {
                id,
                marker: marker.into_boxed_str(),
                group,
                group_names,
                hir,
            });
        }
        let unknown_group = group_of(RuleId::UNKNOWN_NAME)?;

        debug!(
            rules = compiled.len(),
            aliases = aliases.len(),
            "compiled matcher"
        );

        Ok(CompiledMatcher {
            pattern,
            regex,
            rules: compiled,
            unknown_group,
            unknown: RuleId::unknown(),
            aliases,
            config: meta_config(),
            scanners: OnceLock::new(),
        })
    }

    fn parser(&self) -> regex_syntax::Parser {
        let options = &self.options;
        regex_syntax::ParserBuilder::new()
            .utf8(false)
            .multi_line(options.multi_line)
            .dot_matches_new_line(options.dot_matches_new_line)
            .case_insensitive(options.case_insensitive)
            .unicode(options.unicode)
            .build()
    }

    fn syntax_config(&self) -> syntax::Config {
        let options = &self.options;
        syntax::Config::new()
            .utf8(false)
            .multi_line(options.multi_line)
            .dot_matches_new_line(options.dot_matches_new_line)
            .case_insensitive(options.case_insensitive)
            .unicode(options.unicode)
    }
}

fn meta_config() -> meta::Config {
    meta::Config::new()
        .match_kind(MatchKind::LeftmostFirst)
        .utf8_empty(false)
}

/// Names of every named capture group in `hir`, in pattern order.
fn capture_names<'h>(hir: &'h Hir, names: &mut Vec<&'h str>) {
    match hir.kind() {
        HirKind::Capture(capture) => {
            if let Some(name) = &capture.name {
                names.push(name);
            }
            capture_names(&capture.sub, names);
        }
        HirKind::Repetition(repetition) => capture_names(&repetition.sub, names),
        HirKind::Concat(subs) | HirKind::Alternation(subs) => {
            for sub in subs {
                capture_names(sub, names);
            }
        }
        HirKind::Empty | HirKind::Literal(_) | HirKind::Class(_) | HirKind::Look(_) => {}
    }
}

fn check_identifier(rule: &TokenDefinition) -> Result<(), CompilationError> {
    if rule.id.as_name().is_some_and(str::is_empty) {
        return Err(CompilationError::empty_name(&rule.pattern));
    }
    if rule.id.is_reserved() {
        return Err(CompilationError::reserved_name(&rule.id));
    }
    Ok(())
}

/// One rule inside the combined matcher.
#[derive(Debug)]
struct CompiledRule {
    id: RuleId,
    marker: Box<str>,
    /// Index of the marker group in the combined pattern.
    group: usize,
    /// Names of the rule's own capture groups, in group order.
    group_names: Vec<Option<Arc<str>>>,
    hir: Hir,
}

/// Which alternative of the combined pattern fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fired {
    /// Rule at this position of the rule table.
    Rule(usize),
    Unknown,
}

/// A single anchored match, before it becomes a token.
#[derive(Clone, Debug)]
pub(crate) struct RawMatch {
    pub fired: Fired,
    pub span: Range<usize>,
    /// Participating sub-groups: `(sub-group index, name, span)`, where 0 is
    /// the rule's first group.
    /// Only collected on request.
    pub groups: Vec<(u32, Option<Arc<str>>, Range<usize>)>,
}

/// The compiled form of a rule table.
///
/// Immutable and `Sync`; one matcher may serve any number of concurrent
/// scans.
#[derive(Debug)]
pub struct CompiledMatcher {
    pattern: String,
    regex: meta::Regex,
    rules: Vec<CompiledRule>,
    unknown_group: usize,
    unknown: RuleId,
    aliases: FxHashMap<Box<str>, RuleId>,
    config: meta::Config,
    /// Per-rule scanners, built on the first zero-width match.
    scanners: OnceLock<Result<Vec<RuleScanner>, CompilationError>>,
}

impl CompiledMatcher {
    /// The combined pattern source.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rule identifiers in declaration order.
    pub fn rule_ids(&self) -> impl Iterator<Item = &RuleId> {
        self.rules.iter().map(|rule| &rule.id)
    }

    /// Map a dispatch marker back to the rule it stands for.
    pub fn resolve_marker(&self, marker: &str) -> Option<&RuleId> {
        if marker == RuleId::UNKNOWN_NAME {
            return Some(&self.unknown);
        }
        if let Some(id) = self.aliases.get(marker) {
            return Some(id);
        }
        self.rules
            .iter()
            .find(|rule| &*rule.marker == marker)
            .map(|rule| &rule.id)
    }

    /// Dispatch marker used for rule `id`.
    pub fn marker_of(&self, id: &RuleId) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| &rule.id == id)
            .map(|rule| &*rule.marker)
    }

    /// Trial-run the matcher and build the per-rule scanners, so every
    /// deferred compilation failure surfaces now.
    ///
    /// # Errors
    ///
    /// Returns the first rule whose standalone scanner cannot be built.
    pub fn validate(&self) -> Result<(), CompilationError> {
        let trial = Input::new(&b""[..]).anchored(Anchored::Yes);
        let _ = self.regex.search(&trial);
        self.scanners().map(|_| ())
    }

    pub(crate) fn unknown_id(&self) -> &RuleId {
        &self.unknown
    }

    pub(crate) fn rule_id(&self, index: usize) -> &RuleId {
        &self.rules[index].id
    }

    pub(crate) fn create_captures(&self) -> Captures {
        self.regex.create_captures()
    }

    /// Highest-priority match anchored at `offset`.
    ///
    /// `haystack` is the whole (possibly truncated) buffer so look-around
    /// assertions see the context before `offset`.
    pub(crate) fn match_at(
        &self,
        haystack: &[u8],
        offset: usize,
        caps: &mut Captures,
        with_groups: bool,
    ) -> Option<RawMatch> {
        let input = Input::new(haystack)
            .span(offset..haystack.len())
            .anchored(Anchored::Yes);
        self.regex.search_captures(&input, caps);
        let matched = caps.get_match()?;

        let fired = match self
            .rules
            .iter()
            .position(|rule| caps.get_group(rule.group).is_some())
        {
            Some(index) => Fired::Rule(index),
            None if caps.get_group(self.unknown_group).is_some() => Fired::Unknown,
            None => return None,
        };

        let groups = match fired {
            Fired::Rule(index) if with_groups => {
                let rule = &self.rules[index];
                collect_groups(caps, rule.group, &rule.group_names)
            }
            _ => Vec::new(),
        };

        Some(RawMatch {
            fired,
            span: matched.start()..matched.end(),
            groups,
        })
    }

    /// Highest-priority non-empty match anchored at `offset`.
    ///
    /// Used right after a zero-width match: rules are tried one by one in
    /// declaration order and the first that consumes input wins. A rule
    /// whose preferred match is empty (`a*?`) is retried for its longest
    /// match. If no rule consumes input, one byte becomes unknown input.
    pub(crate) fn match_non_empty_at(
        &self,
        haystack: &[u8],
        offset: usize,
        with_groups: bool,
    ) -> Result<Option<RawMatch>, CompilationError> {
        let input = Input::new(haystack)
            .span(offset..haystack.len())
            .anchored(Anchored::Yes);

        for (index, (rule, scanner)) in self.rules.iter().zip(self.scanners()?).enumerate() {
            let Some(caps) = scanner.non_empty(&input) else {
                continue;
            };
            let Some(matched) = caps.get_match() else {
                continue;
            };
            let groups = if with_groups {
                collect_groups(&caps, 0, &rule.group_names)
            } else {
                Vec::new()
            };
            return Ok(Some(RawMatch {
                fired: Fired::Rule(index),
                span: matched.start()..matched.end(),
                groups,
            }));
        }

        Ok((offset < haystack.len()).then(|| RawMatch {
            fired: Fired::Unknown,
            span: offset..offset + 1,
            groups: Vec::new(),
        }))
    }

    fn scanners(&self) -> Result<&[RuleScanner], CompilationError> {
        self.scanners
            .get_or_init(|| {
                self.rules
                    .iter()
                    .map(|rule| RuleScanner::build(rule, &self.config))
                    .collect()
            })
            .as_ref()
            .map(Vec::as_slice)
            .map_err(Clone::clone)
    }
}

/// One rule compiled on its own, for the retry after a zero-width match.
#[derive(Debug)]
struct RuleScanner {
    /// Same match preference as inside the combined pattern.
    preferred: meta::Regex,
    /// Longest match at the anchor, for rules that prefer an empty one.
    longest: meta::Regex,
}

impl RuleScanner {
    fn build(rule: &CompiledRule, config: &meta::Config) -> Result<Self, CompilationError> {
        let build = |config: meta::Config| {
            meta::Builder::new()
                .configure(config)
                .build_from_hir(&rule.hir)
                .map_err(|err| CompilationError::rule_build(&rule.id, err))
        };
        Ok(RuleScanner {
            preferred: build(config.clone())?,
            longest: build(config.clone().match_kind(MatchKind::All))?,
        })
    }

    /// Captures of a non-empty anchored match, if the rule has one.
    fn non_empty(&self, input: &Input<'_>) -> Option<Captures> {
        [&self.preferred, &self.longest]
            .into_iter()
            .find_map(|regex| {
                let mut caps = regex.create_captures();
                regex.search_captures(input, &mut caps);
                caps.get_match()
                    .is_some_and(|matched| !matched.is_empty())
                    .then_some(caps)
            })
    }
}

/// Sub-groups `base + 1 ..= base + names.len()` that took part in a match,
/// keyed by their 0-based position within the rule.
fn collect_groups(
    caps: &Captures,
    base: usize,
    names: &[Option<Arc<str>>],
) -> Vec<(u32, Option<Arc<str>>, Range<usize>)> {
    names
        .iter()
        .enumerate()
        .filter_map(|(position, name)| {
            let span = caps.get_group(base + position + 1)?;
            let index = u32::try_from(position).ok()?;
            Some((index, name.clone(), span.start..span.end))
        })
        .collect()
}
