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
use crate::ast::{GenericsKind, GenericsType, TypeKind, TypeRef};
use crate::builders::AstBuilder;
use crate::cst::{CstNode, Role};
use crate::position::{SpanSource, configure};
use gravel_common::CompileError;

impl AstBuilder {
    /// A written type: class or primitive, then any `[]` dimensions.
    pub(crate) fn build_type(&mut self, node: &CstNode) -> Result<TypeRef, CompileError> {
        let dimensions = node.tokens(Role::Dimension).count();
        let mut ty = if let Some(class) = node.child(Role::Class) {
            let mut ty = self.build_class_or_interface_type(class)?;
            // Type arguments on an array's component are dropped.
            if dimensions > 0 {
                if let TypeKind::Class { generics, .. } = &mut ty.kind {
                    *generics = None;
                }
            }
            ty
        } else if let Some(primitive) = node.token(Role::Primitive) {
            TypeRef::new(TypeKind::Primitive(primitive.text.clone()), primitive.source_span())
        } else {
            return Err(self.parse_error(node, "Unsupported type"));
        };
        for _ in 0..dimensions {
            ty = ty.array_of();
        }
        Ok(configure(ty, node))
    }

    fn build_class_or_interface_type(&mut self, node: &CstNode) -> Result<TypeRef, CompileError> {
        let mut ty = self.build_qualified_class_name(self.required(node, Role::Name)?);
        if let Some(arguments) = node.child(Role::TypeArguments) {
            let arguments = self.build_type_arguments(arguments)?;
            if let TypeKind::Class { generics, .. } = &mut ty.kind {
                *generics = Some(arguments);
            }
        }
        Ok(configure(ty, node))
    }

    pub(crate) fn build_qualified_class_name(&self, node: &CstNode) -> TypeRef {
        TypeRef::class(self.qualified_name(node), node.source_span())
    }

    /// `<...>`; no arguments at all is a diamond and gives an empty list.
    pub(crate) fn build_type_arguments(
        &mut self,
        node: &CstNode,
    ) -> Result<Vec<GenericsType>, CompileError> {
        node.children(Role::Argument)
            .map(|a| self.build_type_argument(a))
            .collect()
    }

    fn build_type_argument(&mut self, node: &CstNode) -> Result<GenericsType, CompileError> {
        let span = node.source_span();
        if node.has(Role::Question) {
            let bound = node.child(Role::Type).map(|t| self.build_type(t)).transpose()?;
            let (upper_bound, lower_bound) = match node.token(Role::Keyword) {
                Some(k) if k.is("extends") => (bound, None),
                Some(k) if k.is("super") => (None, bound),
                Some(_) => return Err(self.parse_error(node, "Unsupported wildcard bound")),
                None => (None, None),
            };
            return Ok(GenericsType {
                kind: GenericsKind::Wildcard {
                    upper_bound,
                    lower_bound,
                },
                span,
            });
        }
        let ty = self.build_type(self.required(node, Role::Type)?)?;
        Ok(GenericsType {
            kind: GenericsKind::Type(ty),
            span,
        })
    }
}
