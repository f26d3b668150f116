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
use crate::ast::{CaseStmt, Stmt, StmtKind};
use crate::builders::AstBuilder;
use crate::cst::{CstNode, Role};
use crate::position::SpanSource;
use gravel_common::CompileError;

const DUPLICATE_DEFAULT: &str =
    "switch statement should have only one default case, default should appear last";
const DEFAULT_NOT_LAST: &str = "default should appear last";

/// One flattened label of a switch body, in source order.
enum SwitchItem {
    Case(CaseStmt),
    Default(Stmt),
}

impl AstBuilder {
    /// Labels sharing a group fall through: only the group's last case label gets the body,
    /// and every `default` label in the group stands for that same body.
    pub(crate) fn build_switch(&mut self, node: &CstNode) -> Result<Stmt, CompileError> {
        let span = node.source_span();
        let subject = self.build_expression(self.required(node, Role::Condition)?)?;

        let mut items = vec![];
        for group in node.children(Role::Group) {
            let labels: Vec<&CstNode> = group.children(Role::Label).collect();
            let first = labels
                .first()
                .ok_or_else(|| self.parse_error(group, "Switch group without a label"))?;
            let case_span = self.required_token(first, Role::Keyword)?.source_span();
            let body = self.build_block_statements(group.child(Role::Body), group.source_span())?;

            for (i, label) in labels.iter().enumerate() {
                let keyword = self.required_token(label, Role::Keyword)?;
                match keyword.text.as_str() {
                    "case" => {
                        let expr = self.build_expression(self.required(label, Role::Expression)?)?;
                        let body = if i + 1 == labels.len() {
                            body.clone()
                        } else {
                            Stmt::empty(case_span)
                        };
                        items.push(SwitchItem::Case(CaseStmt {
                            expr,
                            body,
                            span: case_span,
                        }));
                    }
                    "default" => items.push(SwitchItem::Default(body.clone())),
                    _ => return Err(self.parse_error(label, "Unsupported switch label")),
                }
            }
        }

        let last_is_case = matches!(items.last(), Some(SwitchItem::Case(_)));
        let mut cases = vec![];
        let mut defaults = vec![];
        for item in items {
            match item {
                SwitchItem::Case(case) => cases.push(case),
                SwitchItem::Default(body) => defaults.push(body),
            }
        }
        if defaults.len() > 1 {
            return Err(CompileError::invalid(DUPLICATE_DEFAULT, defaults[0].span));
        }
        if let Some(default) = defaults.first()
            && last_is_case
        {
            return Err(CompileError::invalid(DEFAULT_NOT_LAST, default.span));
        }
        let default = defaults.pop().unwrap_or_else(|| Stmt::empty(span));

        Ok(Stmt::new(
            StmtKind::Switch {
                subject,
                cases,
                default: default.boxed(),
            },
            span,
        ))
    }
}
