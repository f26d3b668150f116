// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Declaration modifiers and annotations.
//!
//! A [`ModifierSet`] is collected once per declaration and applied to exactly that declaration.
//! Keywords resolve to access flags through a fixed table; `def` and annotations contribute no
//! flag bits.

use crate::ast::{Annotation, Declaration, MethodDecl, Parameter, Variable};
use gravel_common::Span;
use gravel_common::flags::*;
use lazy_static::lazy_static;
use std::collections::HashMap;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ModifierKind {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    /// The untyped declaration marker.
    Def,
    Annotation,
}

lazy_static! {
    static ref ACCESS_FLAGS: HashMap<ModifierKind, u32> = HashMap::from([
        (ModifierKind::Annotation, 0),
        (ModifierKind::Def, 0),
        (ModifierKind::Native, ACC_NATIVE),
        (ModifierKind::Synchronized, ACC_SYNCHRONIZED),
        (ModifierKind::Transient, ACC_TRANSIENT),
        (ModifierKind::Volatile, ACC_VOLATILE),
        (ModifierKind::Public, ACC_PUBLIC),
        (ModifierKind::Protected, ACC_PROTECTED),
        (ModifierKind::Private, ACC_PRIVATE),
        (ModifierKind::Static, ACC_STATIC),
        (ModifierKind::Abstract, ACC_ABSTRACT),
        (ModifierKind::Final, ACC_FINAL),
        (ModifierKind::Strictfp, ACC_STRICT),
    ]);
}

impl ModifierKind {
    pub fn access_flag(&self) -> u32 {
        ACCESS_FLAGS.get(self).copied().unwrap_or(0)
    }

    pub fn is_visibility(&self) -> bool {
        matches!(
            self,
            ModifierKind::Public | ModifierKind::Protected | ModifierKind::Private
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifierNode {
    pub kind: ModifierKind,
    /// Set for [`ModifierKind::Annotation`] entries.
    pub annotation: Option<Annotation>,
    pub span: Span,
}

impl ModifierNode {
    pub fn keyword(kind: ModifierKind, span: Span) -> Self {
        Self {
            kind,
            annotation: None,
            span,
        }
    }

    pub fn annotation(annotation: Annotation) -> Self {
        let span = annotation.span;
        Self {
            kind: ModifierKind::Annotation,
            annotation: Some(annotation),
            span,
        }
    }

    pub fn is_annotation(&self) -> bool {
        self.kind == ModifierKind::Annotation
    }

    /// A real modifier keyword, i.e. neither an annotation nor `def`.
    pub fn is_modifier(&self) -> bool {
        !matches!(self.kind, ModifierKind::Annotation | ModifierKind::Def)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierSet {
    nodes: Vec<ModifierNode>,
}

impl ModifierSet {
    pub fn new(nodes: Vec<ModifierNode>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ModifierNode] {
        &self.nodes
    }

    pub fn contains(&self, kind: ModifierKind) -> bool {
        self.nodes.iter().any(|n| n.kind == kind)
    }

    pub fn contains_annotations(&self) -> bool {
        self.nodes.iter().any(ModifierNode::is_annotation)
    }

    pub fn contains_visibility_modifier(&self) -> bool {
        self.nodes.iter().any(|n| n.kind.is_visibility())
    }

    pub fn contains_non_visibility_modifier(&self) -> bool {
        self.nodes
            .iter()
            .any(|n| n.is_modifier() && !n.kind.is_visibility())
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        self.nodes
            .iter()
            .filter_map(|n| n.annotation.clone())
            .collect()
    }

    /// All flag bits OR-ed together.
    pub fn flags(&self) -> u32 {
        self.nodes
            .iter()
            .fold(0, |acc, n| acc | n.kind.access_flag())
    }

    pub fn apply_to_parameter(&self, parameter: &mut Parameter) {
        parameter.modifiers |= self.flags();
        parameter.annotations.extend(self.annotations());
    }

    /// Local variables take flags only.
    pub fn apply_to_variable(&self, variable: &mut Variable) {
        variable.modifiers |= self.flags();
    }

    pub fn apply_to_declaration(&self, declaration: &mut Declaration) {
        self.apply_to_variable(&mut declaration.variable);
        declaration.annotations.extend(self.annotations());
    }

    pub fn apply_to_method(&self, method: &mut MethodDecl) {
        method.modifiers |= self.flags();
        method.annotations.extend(self.annotations());
    }

    pub fn visibility_facts(
        &self,
        has_explicit_return_type: bool,
        is_annotation_member: bool,
    ) -> VisibilityFacts {
        VisibilityFacts {
            has_visibility_modifier: self.contains_visibility_modifier(),
            has_other_modifier: self.contains_non_visibility_modifier(),
            has_annotation: self.contains_annotations(),
            has_explicit_return_type,
            has_untyped_marker: self.contains(ModifierKind::Def),
            is_annotation_member,
        }
    }
}

/// Inputs of the implicit public visibility rule for method declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityFacts {
    pub has_visibility_modifier: bool,
    pub has_other_modifier: bool,
    pub has_annotation: bool,
    pub has_explicit_return_type: bool,
    pub has_untyped_marker: bool,
    pub is_annotation_member: bool,
}

impl VisibilityFacts {
    /// Methods are public unless a visibility keyword says otherwise; `def` together with a
    /// return type counts as an explicit public marker.
    pub fn is_synthetic_public(&self) -> bool {
        if self.has_visibility_modifier {
            return false;
        }
        if self.is_annotation_member {
            return true;
        }
        if self.has_untyped_marker && self.has_explicit_return_type {
            return true;
        }
        self.has_other_modifier || self.has_annotation || !self.has_explicit_return_type
    }
}
