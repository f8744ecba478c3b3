//! Construction pattern matching
//!
//! Each construction is a structural template over the dependency graph:
//! an anchor constraint (dependency label, coarse/fine tag, head tag) plus
//! required roles searched among the anchor's or the anchor head's
//! children. Role candidates combine as a cross product, so alternate
//! attachments are never silently dropped; candidate order follows
//! child-index order, making output deterministic.
//!
//! Dative and modal constructions share the generic template engine below.
//! Noun-phrase constructions walk noun chunks and subtrees directly.

use crate::filter::ExclusionFilter;
use crate::graph::{Context, Sentence, Token, TokenId};
use crate::record::{DativeRecord, MatchRecord, ModalRecord, NounPhraseRecord};

/// The construction kinds this crate extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construction {
    DoubleObject,
    Prepositional,
    ModalBare,
    ModalProgressive,
    ModalPerfect,
    ModalPassive,
    ModalPassivePerfect,
    AttributiveAdjective,
    PremodifyingNoun,
    RelativeClause,
    IngClause,
    EdClause,
    PrepPhraseOf,
    PrepPhraseOther,
}

impl Construction {
    /// Registry order; also the grouping order of the final table
    pub const ALL: [Construction; 14] = [
        Construction::DoubleObject,
        Construction::Prepositional,
        Construction::ModalBare,
        Construction::ModalProgressive,
        Construction::ModalPerfect,
        Construction::ModalPassive,
        Construction::ModalPassivePerfect,
        Construction::AttributiveAdjective,
        Construction::PremodifyingNoun,
        Construction::RelativeClause,
        Construction::IngClause,
        Construction::EdClause,
        Construction::PrepPhraseOf,
        Construction::PrepPhraseOther,
    ];

    /// Discriminator value used in the `construction_type` column
    pub fn name(self) -> &'static str {
        match self {
            Construction::DoubleObject => "double_object",
            Construction::Prepositional => "prepositional",
            Construction::ModalBare => "modal_bare",
            Construction::ModalProgressive => "modal_progressive",
            Construction::ModalPerfect => "modal_perfect",
            Construction::ModalPassive => "modal_passive",
            Construction::ModalPassivePerfect => "modal_passive_perfect",
            Construction::AttributiveAdjective => "attributive_adjective",
            Construction::PremodifyingNoun => "premodifying_noun",
            Construction::RelativeClause => "relative_clause",
            Construction::IngClause => "ing_clause",
            Construction::EdClause => "ed_clause",
            Construction::PrepPhraseOf => "prep_phrase_of",
            Construction::PrepPhraseOther => "prep_phrase_other",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Construction::ALL.into_iter().find(|c| c.name() == name)
    }

    /// pre/post position of the modifier, for noun-phrase constructions
    pub fn modifier_position(self) -> Option<&'static str> {
        match self {
            Construction::AttributiveAdjective | Construction::PremodifyingNoun => Some("pre"),
            Construction::RelativeClause
            | Construction::IngClause
            | Construction::EdClause
            | Construction::PrepPhraseOf
            | Construction::PrepPhraseOther => Some("post"),
            _ => None,
        }
    }

    /// phrasal/clausal classification, for noun-phrase constructions
    pub fn modifier_type(self) -> Option<&'static str> {
        match self {
            Construction::AttributiveAdjective
            | Construction::PremodifyingNoun
            | Construction::PrepPhraseOf
            | Construction::PrepPhraseOther => Some("phrasal"),
            Construction::RelativeClause | Construction::IngClause | Construction::EdClause => {
                Some("clausal")
            }
            _ => None,
        }
    }
}

/// Conjunction of attribute constraints an anchor token must satisfy
#[derive(Debug, Clone, Copy)]
struct AnchorSpec {
    dep: Option<&'static str>,
    tag: Option<&'static str>,
    pos: Option<&'static str>,
    pos_not: Option<&'static str>,
    head_pos: Option<&'static str>,
    head_tag: Option<&'static str>,
    is_root: bool,
}

impl AnchorSpec {
    const fn any() -> Self {
        Self {
            dep: None,
            tag: None,
            pos: None,
            pos_not: None,
            head_pos: None,
            head_tag: None,
            is_root: false,
        }
    }

    fn matches(&self, sent: &Sentence, token: &Token) -> bool {
        if let Some(dep) = self.dep {
            if token.dep != dep {
                return false;
            }
        }
        if let Some(tag) = self.tag {
            if token.tag != tag {
                return false;
            }
        }
        if let Some(pos) = self.pos {
            if token.pos != pos {
                return false;
            }
        }
        if let Some(pos_not) = self.pos_not {
            if token.pos == pos_not {
                return false;
            }
        }
        if self.is_root && token.head.is_some() {
            return false;
        }
        if self.head_pos.is_some() || self.head_tag.is_some() {
            let Some(head) = sent.head(token.idx) else {
                return false;
            };
            if let Some(head_pos) = self.head_pos {
                if head.pos != head_pos {
                    return false;
                }
            }
            if let Some(head_tag) = self.head_tag {
                if head.tag != head_tag {
                    return false;
                }
            }
        }
        true
    }
}

/// Where a role's candidates are searched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleScope {
    /// Children of the anchor's head
    HeadChildren,
    /// Children of the anchor token itself
    AnchorChildren,
}

/// A required role: dependency label, optional fine-tag constraint, scope
#[derive(Debug, Clone, Copy)]
struct RoleSpec {
    dep: &'static str,
    tag: Option<&'static str>,
    scope: RoleScope,
}

const fn role(dep: &'static str, tag: Option<&'static str>, scope: RoleScope) -> RoleSpec {
    RoleSpec { dep, tag, scope }
}

/// A full declarative pattern: anchor plus required roles
struct Template {
    anchor: AnchorSpec,
    roles: &'static [RoleSpec],
}

/// An anchor with one candidate bound per role, in template role order
#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    anchor: TokenId,
    roles: Vec<TokenId>,
}

/// Find all role bindings for a template in a sentence
///
/// Anchors are visited in token-index order; role candidates in
/// child-index order, nested in template role order. Every combination of
/// eligible candidates yields one binding.
fn find_bindings(sent: &Sentence, filter: &ExclusionFilter, template: &Template) -> Vec<Binding> {
    let mut bindings = Vec::new();
    for token in &sent.tokens {
        if !template.anchor.matches(sent, token) || !filter.is_eligible(token) {
            continue;
        }
        let mut bound = Vec::with_capacity(template.roles.len());
        bind_roles(
            sent,
            filter,
            token.idx,
            template.roles,
            &mut bound,
            &mut bindings,
        );
    }
    bindings
}

fn bind_roles(
    sent: &Sentence,
    filter: &ExclusionFilter,
    anchor: TokenId,
    roles: &[RoleSpec],
    bound: &mut Vec<TokenId>,
    out: &mut Vec<Binding>,
) {
    let Some(role) = roles.first() else {
        out.push(Binding {
            anchor,
            roles: bound.clone(),
        });
        return;
    };
    let scope = match role.scope {
        RoleScope::AnchorChildren => Some(anchor),
        RoleScope::HeadChildren => sent.tokens[anchor].head,
    };
    let Some(scope) = scope else {
        return;
    };
    for candidate in sent.children(scope) {
        if candidate.dep != role.dep {
            continue;
        }
        if let Some(tag) = role.tag {
            if candidate.tag != tag {
                continue;
            }
        }
        if !filter.is_eligible(candidate) {
            continue;
        }
        bound.push(candidate.idx);
        bind_roles(sent, filter, anchor, &roles[1..], bound, out);
        bound.pop();
    }
}

const DOUBLE_OBJECT: Template = Template {
    anchor: AnchorSpec {
        dep: Some("dative"),
        pos_not: Some("ADP"),
        head_pos: Some("VERB"),
        ..AnchorSpec::any()
    },
    roles: &[
        role("nsubj", None, RoleScope::HeadChildren),
        role("dobj", None, RoleScope::HeadChildren),
    ],
};

const PREPOSITIONAL: Template = Template {
    anchor: AnchorSpec {
        dep: Some("dative"),
        pos: Some("ADP"),
        head_pos: Some("VERB"),
        ..AnchorSpec::any()
    },
    roles: &[
        role("nsubj", None, RoleScope::HeadChildren),
        role("dobj", None, RoleScope::HeadChildren),
        role("pobj", None, RoleScope::AnchorChildren),
    ],
};

const MODAL_ACTIVE_ROLES: &[RoleSpec] = &[role("nsubj", None, RoleScope::HeadChildren)];

const fn modal_active(head_tag: &'static str) -> Template {
    Template {
        anchor: AnchorSpec {
            dep: Some("aux"),
            tag: Some("MD"),
            head_tag: Some(head_tag),
            ..AnchorSpec::any()
        },
        roles: MODAL_ACTIVE_ROLES,
    }
}

const MODAL_BARE: Template = modal_active("VB");
const MODAL_PROGRESSIVE: Template = modal_active("VBG");
const MODAL_PERFECT: Template = modal_active("VBN");

const MODAL_PASSIVE: Template = Template {
    anchor: AnchorSpec {
        tag: Some("VBN"),
        is_root: true,
        ..AnchorSpec::any()
    },
    roles: &[
        role("aux", Some("MD"), RoleScope::AnchorChildren),
        role("auxpass", Some("VB"), RoleScope::AnchorChildren),
        role("nsubjpass", None, RoleScope::AnchorChildren),
    ],
};

const MODAL_PASSIVE_PERFECT: Template = Template {
    anchor: AnchorSpec {
        tag: Some("VBN"),
        is_root: true,
        ..AnchorSpec::any()
    },
    roles: &[
        role("aux", Some("MD"), RoleScope::AnchorChildren),
        role("auxpass", Some("VBN"), RoleScope::AnchorChildren),
        role("nsubjpass", None, RoleScope::AnchorChildren),
    ],
};

/// Run one construction's matcher over a sentence, appending records
pub fn extract(
    construction: Construction,
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    match construction {
        Construction::DoubleObject => extract_double_object(sent, filter, context, out),
        Construction::Prepositional => extract_prepositional(sent, filter, context, out),
        Construction::ModalBare => {
            extract_modal_active(Construction::ModalBare, &MODAL_BARE, sent, filter, context, out)
        }
        Construction::ModalProgressive => extract_modal_active(
            Construction::ModalProgressive,
            &MODAL_PROGRESSIVE,
            sent,
            filter,
            context,
            out,
        ),
        Construction::ModalPerfect => extract_modal_active(
            Construction::ModalPerfect,
            &MODAL_PERFECT,
            sent,
            filter,
            context,
            out,
        ),
        Construction::ModalPassive => extract_modal_passive(
            Construction::ModalPassive,
            &MODAL_PASSIVE,
            sent,
            filter,
            context,
            out,
        ),
        Construction::ModalPassivePerfect => extract_modal_passive(
            Construction::ModalPassivePerfect,
            &MODAL_PASSIVE_PERFECT,
            sent,
            filter,
            context,
            out,
        ),
        Construction::AttributiveAdjective => extract_attributive(sent, filter, context, out),
        Construction::PremodifyingNoun => extract_premodifying(sent, filter, context, out),
        Construction::RelativeClause => extract_relative_clause(sent, filter, context, out),
        Construction::IngClause => {
            extract_participial_clause(Construction::IngClause, "VBG", sent, filter, context, out)
        }
        Construction::EdClause => {
            extract_participial_clause(Construction::EdClause, "VBN", sent, filter, context, out)
        }
        Construction::PrepPhraseOf => extract_prep_of(sent, filter, context, out),
        Construction::PrepPhraseOther => extract_prep_other(sent, filter, context, out),
    }
}

fn extract_double_object(
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for binding in find_bindings(sent, filter, &DOUBLE_OBJECT) {
        let dative = &sent.tokens[binding.anchor];
        let Some(verb) = sent.head(binding.anchor) else {
            continue;
        };
        let subject = &sent.tokens[binding.roles[0]];
        let direct_obj = &sent.tokens[binding.roles[1]];
        out.push(MatchRecord::Dative(DativeRecord::double_object(
            sent, dative, verb, subject, direct_obj, context,
        )));
    }
}

fn extract_prepositional(
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for binding in find_bindings(sent, filter, &PREPOSITIONAL) {
        let dative = &sent.tokens[binding.anchor];
        let Some(verb) = sent.head(binding.anchor) else {
            continue;
        };
        let subject = &sent.tokens[binding.roles[0]];
        let direct_obj = &sent.tokens[binding.roles[1]];
        let pre_obj = &sent.tokens[binding.roles[2]];
        out.push(MatchRecord::Dative(DativeRecord::prepositional(
            sent, dative, verb, subject, direct_obj, pre_obj, context,
        )));
    }
}

fn extract_modal_active(
    construction: Construction,
    template: &Template,
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for binding in find_bindings(sent, filter, template) {
        let modal = &sent.tokens[binding.anchor];
        let Some(verb) = sent.head(binding.anchor) else {
            continue;
        };
        let subject = &sent.tokens[binding.roles[0]];
        out.push(MatchRecord::Modal(ModalRecord::new(
            construction,
            sent,
            subject,
            modal,
            verb,
            context,
        )));
    }
}

fn extract_modal_passive(
    construction: Construction,
    template: &Template,
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for binding in find_bindings(sent, filter, template) {
        // roles: aux, auxpass, nsubjpass; the auxpass constrains the match
        // but is not exported
        let verb = &sent.tokens[binding.anchor];
        let modal = &sent.tokens[binding.roles[0]];
        let subject = &sent.tokens[binding.roles[2]];
        out.push(MatchRecord::Modal(ModalRecord::new(
            construction,
            sent,
            subject,
            modal,
            verb,
            context,
        )));
    }
}

fn extract_attributive(
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for chunk in &sent.chunks {
        let Some(head) = sent.get(chunk.head) else {
            continue;
        };
        if !filter.is_eligible(head) {
            continue;
        }
        let mut adjectives: Vec<TokenId> = Vec::new();
        for idx in chunk.start..=chunk.end {
            let Some(token) = sent.get(idx) else {
                break;
            };
            if token.dep != "amod" || token.pos != "ADJ" || !filter.is_eligible(token) {
                continue;
            }
            if !adjectives.contains(&idx) {
                adjectives.push(idx);
                // pull in coordinated adjectives, transitively
                for conj in sent.conjuncts(idx) {
                    let other = &sent.tokens[conj];
                    if other.pos == "ADJ"
                        && filter.is_eligible(other)
                        && !adjectives.contains(&conj)
                    {
                        adjectives.push(conj);
                    }
                }
            }
        }
        if adjectives.is_empty() {
            continue;
        }
        adjectives.sort_unstable();
        let modifier_text = adjectives
            .iter()
            .map(|&i| sent.tokens[i].text.as_str())
            .collect::<Vec<_>>()
            .join(" and ");
        out.push(MatchRecord::NounPhrase(NounPhraseRecord::new(
            Construction::AttributiveAdjective,
            sent,
            modifier_text,
            &head.text,
            context,
        )));
    }
}

fn extract_premodifying(
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for chunk in &sent.chunks {
        for idx in chunk.start..=chunk.end {
            let Some(token) = sent.get(idx) else {
                break;
            };
            if token.dep != "compound" || !filter.is_eligible(token) {
                continue;
            }
            let Some(head) = sent.head(idx) else {
                continue;
            };
            if head.pos == "NOUN" && chunk.contains(head.idx) && filter.is_eligible(head) {
                out.push(MatchRecord::NounPhrase(NounPhraseRecord::new(
                    Construction::PremodifyingNoun,
                    sent,
                    token.text.clone(),
                    &head.text,
                    context,
                )));
            }
        }
    }
}

fn extract_relative_clause(
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for token in &sent.tokens {
        if token.dep != "relcl" || !filter.is_eligible(token) {
            continue;
        }
        let Some(head) = sent.head(token.idx) else {
            continue;
        };
        if head.pos != "NOUN" || !filter.is_eligible(head) {
            continue;
        }
        out.push(MatchRecord::NounPhrase(NounPhraseRecord::new(
            Construction::RelativeClause,
            sent,
            sent.subtree_text(token.idx),
            &head.text,
            context,
        )));
    }
}

fn extract_participial_clause(
    construction: Construction,
    tag: &str,
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for token in &sent.tokens {
        if token.pos != "VERB" || token.dep != "acl" || token.tag != tag {
            continue;
        }
        if !filter.is_eligible(token) {
            continue;
        }
        let Some(head) = sent.head(token.idx) else {
            continue;
        };
        if !filter.is_eligible(head) {
            continue;
        }
        out.push(MatchRecord::NounPhrase(NounPhraseRecord::new(
            construction,
            sent,
            sent.subtree_text(token.idx),
            &head.text,
            context,
        )));
    }
}

fn extract_prep_of(
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for token in &sent.tokens {
        if token.dep != "prep" || !token.text.eq_ignore_ascii_case("of") {
            continue;
        }
        if !filter.is_eligible(token) {
            continue;
        }
        let Some(head) = sent.head(token.idx) else {
            continue;
        };
        if head.pos != "NOUN" || !filter.is_eligible(head) {
            continue;
        }
        if !sent.children(token.idx).any(|c| c.pos == "NOUN") {
            continue;
        }
        let mut object_text = String::new();
        for child in sent.children(token.idx) {
            if child.dep != "punct" {
                object_text.push_str(&child.text_with_ws());
            }
        }
        let modifier_text = format!("of {}", object_text.trim());
        out.push(MatchRecord::NounPhrase(NounPhraseRecord::new(
            Construction::PrepPhraseOf,
            sent,
            modifier_text,
            &head.text,
            context,
        )));
    }
}

fn extract_prep_other(
    sent: &Sentence,
    filter: &ExclusionFilter,
    context: &Context,
    out: &mut Vec<MatchRecord>,
) {
    for token in &sent.tokens {
        if token.dep != "prep" || token.lemma == "of" || !filter.is_eligible(token) {
            continue;
        }
        let Some(head) = sent.head(token.idx) else {
            continue;
        };
        if head.pos != "NOUN" || !filter.is_eligible(head) {
            continue;
        }
        // every eligible prepositional object yields a record, matching
        // the cross-product semantics of the other constructions
        for pobj in sent.children(token.idx) {
            if pobj.dep == "pobj" && pobj.pos == "NOUN" && filter.is_eligible(pobj) {
                out.push(MatchRecord::NounPhrase(NounPhraseRecord::new(
                    Construction::PrepPhraseOther,
                    sent,
                    format!("{} {}", token.text, pobj.text),
                    &head.text,
                    context,
                )));
            }
        }
    }
}
