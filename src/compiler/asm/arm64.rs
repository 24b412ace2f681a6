use crate::compiler::err::CompileError;
use crate::compiler::syntax::ast::node::{NodeId, NodeKind};
use crate::compiler::syntax::ast::operator::Operator;
use crate::compiler::syntax::ast::Ast;
use crate::constants::common::{ENTRY_SYMBOL, PRINT_BUILTIN, STRING_LABEL_PREFIX, SYMBOL_PREFIX};
use crate::sys_error;
use crate::util::pretty_format::indent;
use crate::CompileResult;

use super::builtin::Routine;
use super::generator::{FunctionBlock, Target};
use super::instruction::{Instruction, Opcode, Operand, Register};

/// Stack-machine lowering to Arm64 text: every expression leaves its value
/// in `s0`, and a binary operation parks its left operand on the stack
/// while the right one is evaluated.
#[derive(Debug, Default)]
pub struct Arm64 {
    strings: Vec<String>,
    routines: Vec<Routine>,
}

impl Arm64 {
    #[must_use]
    pub fn new() -> Arm64 {
        Arm64::default()
    }

    fn use_routine(&mut self, routine: Routine) {
        if !self.routines.contains(&routine) {
            self.routines.push(routine);
        }
    }

    fn string_label(&mut self, string: &str) -> String {
        let index = self.strings.len();
        self.strings.push(string.to_string());
        format!("{STRING_LABEL_PREFIX}_{index}")
    }

    fn emit_binary(
        &mut self,
        ast: &Ast,
        node: NodeId,
        operator: Operator,
        left: NodeId,
        right: NodeId,
    ) -> CompileResult<Vec<Instruction>> {
        let opcode = match operator {
            Operator::Add => Opcode::Fadd,
            Operator::Subtract => Opcode::Fsub,
            Operator::Multiply => Opcode::Fmul,
            Operator::Divide => Opcode::Fdiv,
            Operator::Power | Operator::Modulo | Operator::And | Operator::Or | Operator::Not => {
                return Err(unsupported(ast, node, &format!("The '{operator}' operator")));
            }
        };
        let mut instructions = self.emit(ast, left)?;
        instructions.push(Instruction::new(
            Opcode::Str,
            vec![Register::S0.into(), Operand::Push],
        ));
        instructions.extend(self.emit(ast, right)?);
        instructions.push(Instruction::new(
            Opcode::Fmov,
            vec![Register::S1.into(), Register::S0.into()],
        ));
        instructions.push(Instruction::new(
            Opcode::Ldr,
            vec![Register::S0.into(), Operand::Pop],
        ));
        instructions.push(Instruction::new(
            opcode,
            vec![Register::S0.into(), Register::S0.into(), Register::S1.into()],
        ));
        Ok(instructions)
    }

    fn emit_call(
        &mut self,
        ast: &Ast,
        node: NodeId,
        callee: NodeId,
        arguments: &[NodeId],
    ) -> CompileResult<Vec<Instruction>> {
        let Some(function) = ast.program().call_target(node) else {
            return match ast.kind(callee) {
                NodeKind::Identifier { symbol } if symbol == PRINT_BUILTIN => {
                    self.emit_print(ast, node, arguments)
                }
                _ => Err(unsupported(ast, node, "Calling a function value")),
            };
        };
        if !arguments.is_empty() {
            return Err(unsupported(ast, node, "Passing arguments"));
        }
        let NodeKind::FunctionLiteral(detail) = ast.kind(function) else {
            sys_error!("calls resolve to function literals")
        };
        Ok(vec![Instruction::new(
            Opcode::Bl,
            vec![Operand::Label(format!("{SYMBOL_PREFIX}{}", detail.symbol))],
        )])
    }

    fn emit_print(
        &mut self,
        ast: &Ast,
        node: NodeId,
        arguments: &[NodeId],
    ) -> CompileResult<Vec<Instruction>> {
        let [argument] = arguments else {
            return Err(unsupported(ast, node, "Printing several values"));
        };
        let NodeKind::StringLiteral(string) = ast.kind(*argument) else {
            return Err(unsupported(ast, *argument, "Printing a non-literal value"));
        };
        let label = self.string_label(string);
        self.use_routine(Routine::Print);
        Ok(vec![
            Instruction::new(
                Opcode::Adr,
                vec![Register::X1.into(), Operand::Label(label)],
            ),
            Instruction::new(
                Opcode::Mov,
                vec![Register::X2.into(), Operand::Integer(string.len())],
            ),
            Instruction::new(
                Opcode::Bl,
                vec![Operand::Label(Routine::Print.symbol().to_string())],
            ),
        ])
    }
}

/// `fmov` encodes only ±n/16 × 2^r with n in 16..=31 and r in -3..=4.
fn is_fmov_immediate(value: f64) -> bool {
    let magnitude = value.abs();
    (-3..=4).any(|r| (16..=31).any(|n| f64::from(n) / 16.0 * 2f64.powi(r) == magnitude))
}

/// Other values are staged in `w9` as single-precision bits.
fn load_number(value: f64) -> Vec<Instruction> {
    if is_fmov_immediate(value) {
        return vec![Instruction::new(
            Opcode::Fmov,
            vec![Register::S0.into(), Operand::Immediate(value)],
        )];
    }
    #[allow(clippy::cast_possible_truncation)]
    let bits = (value as f32).to_bits();
    if bits == 0 {
        return vec![Instruction::new(
            Opcode::Fmov,
            vec![Register::S0.into(), Register::Wzr.into()],
        )];
    }
    vec![
        Instruction::new(
            Opcode::Mov,
            vec![Register::W9.into(), Operand::Integer((bits & 0xffff) as usize)],
        ),
        Instruction::new(
            Opcode::Movk,
            vec![
                Register::W9.into(),
                Operand::Integer((bits >> 16) as usize),
                Operand::Shift(16),
            ],
        ),
        Instruction::new(
            Opcode::Fmov,
            vec![Register::S0.into(), Register::W9.into()],
        ),
    ]
}

/// A block that calls out keeps `x29`/`x30` on the stack and restores them
/// before every `ret`.
fn framed(body: Vec<Instruction>) -> Vec<Instruction> {
    if !body.iter().any(|instruction| instruction.opcode == Opcode::Bl) {
        return body;
    }
    let frame = || -> Vec<Operand> { vec![Register::X29.into(), Register::X30.into()] };
    let mut framed = vec![Instruction::new(
        Opcode::Stp,
        [frame(), vec![Operand::Push]].concat(),
    )];
    for instruction in body {
        if instruction.is_return() {
            framed.push(Instruction::new(
                Opcode::Ldp,
                [frame(), vec![Operand::Pop]].concat(),
            ));
        }
        framed.push(instruction);
    }
    framed
}

fn unsupported(ast: &Ast, node: NodeId, what: &str) -> CompileError {
    CompileError::at(
        ast.node(node).position,
        format!("{what} has not been implemented yet"),
    )
}

impl Target for Arm64 {
    type Instruction = Instruction;

    fn emit(&mut self, ast: &Ast, node: NodeId) -> CompileResult<Vec<Instruction>> {
        match ast.kind(node) {
            NodeKind::NumberLiteral(value) => Ok(load_number(*value)),
            NodeKind::BooleanLiteral(value) => Ok(load_number(if *value { 1.0 } else { 0.0 })),
            NodeKind::BinaryOperation {
                operator,
                left,
                right,
            } => self.emit_binary(ast, node, *operator, *left, *right),
            NodeKind::UnaryOperation {
                operator: Operator::Subtract,
                operand,
            } => {
                let mut instructions = self.emit(ast, *operand)?;
                instructions.push(Instruction::new(
                    Opcode::Fneg,
                    vec![Register::S0.into(), Register::S0.into()],
                ));
                Ok(instructions)
            }
            NodeKind::Return { value } => {
                let mut instructions = self.emit(ast, *value)?;
                instructions.push(Instruction::new(Opcode::Ret, Vec::new()));
                Ok(instructions)
            }
            NodeKind::FunctionCall { callee, arguments } => {
                self.emit_call(ast, node, *callee, arguments)
            }
            // nested functions get their own block
            NodeKind::Declaration { value, .. } | NodeKind::Assignment { value, .. }
                if matches!(ast.kind(*value), NodeKind::FunctionLiteral(_)) =>
            {
                Ok(Vec::new())
            }
            kind => Err(unsupported(ast, node, kind.name())),
        }
    }

    fn assemble(&mut self, blocks: Vec<FunctionBlock<Instruction>>) -> String {
        let mut module = format!(".global {ENTRY_SYMBOL}\n.align 2\n\n");
        for FunctionBlock { symbol, mut body } in blocks {
            if !body.last().is_some_and(Instruction::is_return) {
                body.push(Instruction::new(Opcode::Ret, Vec::new()));
            }
            module.push_str(&format!("{SYMBOL_PREFIX}{symbol}:\n"));
            for instruction in framed(body) {
                module.push_str(&format!("{}{instruction}\n", indent(1)));
            }
            module.push('\n');
        }
        for (index, string) in self.strings.iter().enumerate() {
            module.push_str(&format!("{STRING_LABEL_PREFIX}_{index}:\n"));
            module.push_str(&format!("{}.ascii {string:?}\n\n", indent(1)));
        }
        for routine in &self.routines {
            module.push_str(&routine.text());
        }
        module
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::compiler::asm::generator::Generator;
    use crate::compiler::context::Context;
    use crate::compiler::lexis::lexer::Lexer;
    use crate::compiler::semantics::type_inferrer::TypeInferrer;
    use crate::compiler::syntax::parser::Parser;

    fn generate(code: &str) -> CompileResult<String> {
        let tokens = Lexer::new(code).tokenize()?;
        let mut ast = Parser::new(&mut Context::new(), tokens).parse_program()?;
        TypeInferrer::new().infer(&mut ast)?;
        Generator::new(Arm64::new()).generate(&ast)
    }

    #[test]
    fn arithmetic_spills_left_operand() {
        let module = generate("func main = () => {\n    return 1 + 2\n}").unwrap();
        assert_eq!(
            module,
            indoc! {"
                .global _main
                .align 2

                _main:
                    fmov s0, #1
                    str s0, [sp, #-16]!
                    fmov s0, #2
                    fmov s1, s0
                    ldr s0, [sp], #16
                    fadd s0, s0, s1
                    ret

            "}
        );
    }

    #[test]
    fn calls_and_nested_blocks() {
        let module = generate(indoc! {"
            func main = () => {
                func helper = () => {
                    return -2.5
                }
                return helper()
            }
        "})
        .unwrap();
        assert!(module.contains(
            "_main:\n    stp x29, x30, [sp, #-16]!\n    bl _helper\n    ldp x29, x30, [sp], #16\n    ret\n"
        ));
        assert!(module.contains("_helper:\n    fmov s0, #2.5\n    fneg s0, s0\n    ret\n"));
    }

    #[test]
    fn print_appends_string_data_and_routine() {
        let module = generate("func main = () => {\n    print(\"hi\")\n}").unwrap();
        assert!(module.contains(indoc! {"
            _main:
                stp x29, x30, [sp, #-16]!
                adr x1, str_0
                mov x2, #2
                bl _print
                ldp x29, x30, [sp], #16
                ret
        "}));
        assert!(module.contains("str_0:\n    .ascii \"hi\"\n"));
        assert!(module.ends_with("_print:\n    mov x0, #1\n    mov x16, #4\n    svc #0x80\n    ret\n"));
    }

    #[test]
    fn assigned_function_values_are_called_by_symbol() {
        let module = generate(indoc! {"
            func main = () => {
                f = () => {
                    return 1
                }
                return f()
            }
        "})
        .unwrap();
        assert!(module.contains("    bl _anonymous_0\n"));
        assert!(module.contains("_anonymous_0:\n    fmov s0, #1\n    ret\n"));
    }

    #[test]
    fn every_ret_restores_the_frame() {
        let module = generate(indoc! {"
            func main = () => {
                func one = () => {
                    return 1
                }
                return one()
                print(\"unreachable\")
            }
        "})
        .unwrap();
        let main = module
            .split("\n\n")
            .find(|block| block.starts_with("_main:"))
            .unwrap();
        assert_eq!(main.matches("ldp x29, x30, [sp], #16\n    ret").count(), 2);
        assert_eq!(main.matches("stp x29, x30").count(), 1);
    }

    #[test]
    fn literals_outside_the_fmov_range() {
        let body = |value: f64| {
            load_number(value)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(body(0.0), vec!["fmov s0, wzr"]);
        assert_eq!(body(-0.125), vec!["fmov s0, #-0.125"]);
        assert_eq!(body(31.0), vec!["fmov s0, #31"]);
        assert_eq!(
            body(0.1),
            vec!["mov w9, #52429", "movk w9, #15820, lsl #16", "fmov s0, w9"]
        );
        assert_eq!(
            body(255.0),
            vec!["mov w9, #0", "movk w9, #17279, lsl #16", "fmov s0, w9"]
        );
        let module = generate("func main = () => {\n    return false\n}").unwrap();
        assert!(module.contains("_main:\n    fmov s0, wzr\n    ret\n"));
    }

    #[test]
    fn function_values_without_a_literal_are_not_lowered() {
        assert_eq!(
            generate("func main = (func g) => {\n    return g()\n}")
                .unwrap_err()
                .to_string(),
            "Calling a function value has not been implemented yet (2:12)"
        );
    }

    #[test]
    fn missing_main() {
        assert_eq!(
            generate("func helper = () => { return 1 }")
                .unwrap_err()
                .to_string(),
            "No main function was declared"
        );
    }

    #[test]
    fn unsupported_nodes() {
        assert_eq!(
            generate("func main = () => {\n    if true { }\n}")
                .unwrap_err()
                .to_string(),
            "IfStatement has not been implemented yet (2:5)"
        );
        assert_eq!(
            generate("func main = () => {\n    return 2 ^ 3\n}")
                .unwrap_err()
                .to_string(),
            "The '^' operator has not been implemented yet (2:14)"
        );
    }
}
