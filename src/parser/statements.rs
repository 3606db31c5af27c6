/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! Statement parsing: if, for, while, switch, try, etc.

use crate::ast::*;
use crate::parser::{Parser, SyntaxError};
use crate::token::TokenType;

/// Used locally during for-statement parsing before deciding between the
/// classic and for-in forms.
enum ForHead {
    Classic(Option<ForInit>),
    In {
        declaration: bool,
        name: String,
    },
}

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();

        match self.current_token_type() {
            TokenType::CurlyOpen => self.parse_block_statement(),
            TokenType::Var => self.parse_variable_declaration(),
            TokenType::Function => {
                let function = self.parse_function(true)?;
                let name = function.name.clone().expect("declaration must be named");
                Ok(self.statement(
                    start,
                    StatementKind::FunctionDeclaration {
                        name,
                        function: Box::new(function),
                    },
                ))
            }
            TokenType::Return => self.parse_return_statement(),
            TokenType::For => self.parse_for_statement(),
            TokenType::If => self.parse_if_statement(),
            TokenType::Throw => self.parse_throw_statement(),
            TokenType::Try => self.parse_try_statement(),
            TokenType::Break => self.parse_break_statement(),
            TokenType::Continue => self.parse_continue_statement(),
            TokenType::Switch => self.parse_switch_statement(),
            TokenType::Do => self.parse_do_while_statement(),
            TokenType::While => self.parse_while_statement(),
            TokenType::With => self.parse_with_statement(),
            TokenType::Debugger => {
                self.consume();
                self.consume_or_insert_semicolon()?;
                Ok(self.statement(start, StatementKind::Debugger))
            }
            TokenType::Semicolon => {
                self.consume();
                Ok(self.statement(start, StatementKind::Empty))
            }
            TokenType::Identifier if self.next_token().token_type == TokenType::Colon => {
                self.parse_labelled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::CurlyOpen)?;
        let mut children = Vec::new();
        while !self.match_token(TokenType::CurlyClose) && !self.done() {
            children.push(self.parse_statement()?);
        }
        self.consume_token(TokenType::CurlyClose)?;
        Ok(self.statement(start, StatementKind::Block(children)))
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        let expression = self.parse_expression_any()?;
        self.consume_or_insert_semicolon()?;
        Ok(self.statement(start, StatementKind::Expression(Box::new(expression))))
    }

    fn parse_variable_declaration(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::Var)?;
        let declarations = self.parse_variable_declarators()?;
        self.consume_or_insert_semicolon()?;
        Ok(self.statement(start, StatementKind::VariableDeclaration { declarations }))
    }

    fn parse_variable_declarators(&mut self) -> Result<Vec<VariableDeclarator>, SyntaxError> {
        let mut declarations = Vec::new();
        loop {
            let name = self.consume_token(TokenType::Identifier)?.value;
            let init = if self.match_token(TokenType::Equals) {
                self.consume();
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            declarations.push(VariableDeclarator { name, init });
            if !self.match_token(TokenType::Comma) {
                break;
            }
            self.consume();
        }
        Ok(declarations)
    }

    // ReturnStatement : `return` [no LineTerminator here] Expression? `;`
    fn parse_return_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::Return)?;

        // [no LineTerminator here]: if a line terminator follows `return`,
        // ASI inserts a semicolon and the return has no argument.
        if self.current().newline_before
            || self.match_token(TokenType::Semicolon)
            || self.match_token(TokenType::CurlyClose)
            || self.done()
        {
            self.consume_or_insert_semicolon()?;
            return Ok(self.statement(start, StatementKind::Return(None)));
        }

        let argument = self.parse_expression_any()?;
        self.consume_or_insert_semicolon()?;
        Ok(self.statement(start, StatementKind::Return(Some(Box::new(argument)))))
    }

    // ThrowStatement : `throw` [no LineTerminator here] Expression `;`
    fn parse_throw_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::Throw)?;

        // Unlike `return`, a line terminator after `throw` is always an
        // error because `throw;` is never valid.
        if self.current().newline_before {
            return Err(
                self.syntax_error("no line break is allowed between 'throw' and its expression")
            );
        }

        let argument = self.parse_expression_any()?;
        self.consume_or_insert_semicolon()?;
        Ok(self.statement(start, StatementKind::Throw(Box::new(argument))))
    }

    // BreakStatement : `break` [no LineTerminator here] LabelIdentifier? `;`
    fn parse_break_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::Break)?;
        let label = self.parse_optional_label()?;
        self.consume_or_insert_semicolon()?;
        Ok(self.statement(start, StatementKind::Break { label }))
    }

    // ContinueStatement : `continue` [no LineTerminator here] LabelIdentifier? `;`
    fn parse_continue_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::Continue)?;
        let label = self.parse_optional_label()?;
        self.consume_or_insert_semicolon()?;
        Ok(self.statement(start, StatementKind::Continue { label }))
    }

    fn parse_optional_label(&mut self) -> Result<Option<String>, SyntaxError> {
        if self.match_token(TokenType::Identifier) && !self.current().newline_before {
            return Ok(Some(self.consume().value));
        }
        Ok(None)
    }

    fn parse_labelled_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        let label = self.consume_token(TokenType::Identifier)?.value;
        self.consume_token(TokenType::Colon)?;
        let body = self.parse_statement()?;
        Ok(self.statement(
            start,
            StatementKind::Labelled {
                label,
                body: Box::new(body),
            },
        ))
    }

    fn parse_if_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::If)?;
        self.consume_token(TokenType::ParenOpen)?;
        let test = self.parse_expression_any()?;
        self.consume_token(TokenType::ParenClose)?;
        let consequent = self.parse_statement()?;
        let alternate = if self.match_token(TokenType::Else) {
            self.consume();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(self.statement(
            start,
            StatementKind::If {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate,
            },
        ))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::While)?;
        self.consume_token(TokenType::ParenOpen)?;
        let test = self.parse_expression_any()?;
        self.consume_token(TokenType::ParenClose)?;
        let body = self.parse_statement()?;
        Ok(self.statement(
            start,
            StatementKind::While {
                test: Box::new(test),
                body: Box::new(body),
            },
        ))
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::Do)?;
        let body = self.parse_statement()?;
        self.consume_token(TokenType::While)?;
        self.consume_token(TokenType::ParenOpen)?;
        let test = self.parse_expression_any()?;
        self.consume_token(TokenType::ParenClose)?;
        // ASI always applies after `do-while (test)`.
        if self.match_token(TokenType::Semicolon) {
            self.consume();
        }
        Ok(self.statement(
            start,
            StatementKind::DoWhile {
                body: Box::new(body),
                test: Box::new(test),
            },
        ))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::For)?;
        self.consume_token(TokenType::ParenOpen)?;

        let head = self.parse_for_head()?;
        match head {
            ForHead::In { declaration, name } => {
                let object = self.parse_expression_any()?;
                self.consume_token(TokenType::ParenClose)?;
                let body = self.parse_statement()?;
                Ok(self.statement(
                    start,
                    StatementKind::ForIn {
                        declaration,
                        name,
                        object: Box::new(object),
                        body: Box::new(body),
                    },
                ))
            }
            ForHead::Classic(init) => {
                self.consume_token(TokenType::Semicolon)?;
                let test = if self.match_token(TokenType::Semicolon) {
                    None
                } else {
                    Some(Box::new(self.parse_expression_any()?))
                };
                self.consume_token(TokenType::Semicolon)?;
                let update = if self.match_token(TokenType::ParenClose) {
                    None
                } else {
                    Some(Box::new(self.parse_expression_any()?))
                };
                self.consume_token(TokenType::ParenClose)?;
                let body = self.parse_statement()?;
                Ok(self.statement(
                    start,
                    StatementKind::For {
                        init,
                        test,
                        update,
                        body: Box::new(body),
                    },
                ))
            }
        }
    }

    fn parse_for_head(&mut self) -> Result<ForHead, SyntaxError> {
        if self.match_token(TokenType::Semicolon) {
            return Ok(ForHead::Classic(None));
        }

        let start = self.position();
        if self.match_token(TokenType::Var) {
            self.consume();
            // `for (var name in ...)` needs one declarator with no
            // initializer; peek past the name before committing.
            if self.match_token(TokenType::Identifier)
                && self.next_token().token_type == TokenType::In
            {
                let name = self.consume().value;
                self.consume_token(TokenType::In)?;
                return Ok(ForHead::In {
                    declaration: true,
                    name,
                });
            }
            self.forbid_in = true;
            let declarations = self.parse_variable_declarators();
            self.forbid_in = false;
            let declaration =
                self.statement(start, StatementKind::VariableDeclaration { declarations: declarations? });
            return Ok(ForHead::Classic(Some(ForInit::Declaration(Box::new(
                declaration,
            )))));
        }

        self.forbid_in = true;
        let expression = self.parse_expression_any();
        self.forbid_in = false;
        let expression = expression?;
        if self.match_token(TokenType::In) {
            self.consume();
            let name = match &expression.inner {
                ExpressionKind::Identifier(name) => name.clone(),
                _ => return Err(self.syntax_error("invalid left-hand side in for-in")),
            };
            return Ok(ForHead::In {
                declaration: false,
                name,
            });
        }
        Ok(ForHead::Classic(Some(ForInit::Expression(Box::new(
            expression,
        )))))
    }

    fn parse_switch_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::Switch)?;
        self.consume_token(TokenType::ParenOpen)?;
        let discriminant = self.parse_expression_any()?;
        self.consume_token(TokenType::ParenClose)?;
        self.consume_token(TokenType::CurlyOpen)?;

        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.match_token(TokenType::CurlyClose) && !self.done() {
            let test = if self.match_token(TokenType::Case) {
                self.consume();
                let test = self.parse_expression_any()?;
                Some(test)
            } else if self.match_token(TokenType::Default) {
                if seen_default {
                    return Err(self.syntax_error("more than one 'default' clause in switch"));
                }
                seen_default = true;
                self.consume();
                None
            } else {
                return Err(self.expected("'case' or 'default'"));
            };
            self.consume_token(TokenType::Colon)?;
            let mut body = Vec::new();
            while !self.match_token(TokenType::Case)
                && !self.match_token(TokenType::Default)
                && !self.match_token(TokenType::CurlyClose)
                && !self.done()
            {
                body.push(self.parse_statement()?);
            }
            cases.push(SwitchCase { test, body });
        }
        self.consume_token(TokenType::CurlyClose)?;
        Ok(self.statement(
            start,
            StatementKind::Switch {
                discriminant: Box::new(discriminant),
                cases,
            },
        ))
    }

    fn parse_try_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::Try)?;
        if !self.match_token(TokenType::CurlyOpen) {
            return Err(self.expected("block after 'try'"));
        }
        let block = self.parse_block_statement()?;

        let handler = if self.match_token(TokenType::Catch) {
            self.consume();
            self.consume_token(TokenType::ParenOpen)?;
            let param = self.consume_token(TokenType::Identifier)?.value;
            self.consume_token(TokenType::ParenClose)?;
            if !self.match_token(TokenType::CurlyOpen) {
                return Err(self.expected("block after 'catch'"));
            }
            let body = self.parse_block_statement()?;
            Some(CatchClause {
                param,
                body: Box::new(body),
            })
        } else {
            None
        };

        let finalizer = if self.match_token(TokenType::Finally) {
            self.consume();
            if !self.match_token(TokenType::CurlyOpen) {
                return Err(self.expected("block after 'finally'"));
            }
            Some(Box::new(self.parse_block_statement()?))
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.syntax_error("'try' must have a 'catch' or 'finally' clause"));
        }

        Ok(self.statement(
            start,
            StatementKind::Try {
                block: Box::new(block),
                handler,
                finalizer,
            },
        ))
    }

    fn parse_with_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.position();
        self.consume_token(TokenType::With)?;
        self.consume_token(TokenType::ParenOpen)?;
        let object = self.parse_expression_any()?;
        self.consume_token(TokenType::ParenClose)?;
        let body = self.parse_statement()?;
        Ok(self.statement(
            start,
            StatementKind::With {
                object: Box::new(object),
                body: Box::new(body),
            },
        ))
    }

    /// Parse a function expression or declaration; declarations must be
    /// named.
    pub(crate) fn parse_function(&mut self, is_declaration: bool) -> Result<FunctionData, SyntaxError> {
        self.consume_token(TokenType::Function)?;
        let name = if self.match_token(TokenType::Identifier) {
            Some(self.consume().value)
        } else if is_declaration {
            return Err(self.expected("function name"));
        } else {
            None
        };

        self.consume_token(TokenType::ParenOpen)?;
        let mut params = Vec::new();
        while !self.match_token(TokenType::ParenClose) {
            params.push(self.consume_token(TokenType::Identifier)?.value);
            if !self.match_token(TokenType::Comma) {
                break;
            }
            self.consume();
        }
        self.consume_token(TokenType::ParenClose)?;

        self.consume_token(TokenType::CurlyOpen)?;
        let mut body = Vec::new();
        while !self.match_token(TokenType::CurlyClose) && !self.done() {
            body.push(self.parse_statement()?);
        }
        self.consume_token(TokenType::CurlyClose)?;

        Ok(FunctionData { name, params, body })
    }
}
