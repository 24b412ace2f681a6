use compiler::asm::arm64::Arm64;
use compiler::asm::generator::Generator;
use compiler::context::Context;
use compiler::err::CompileError;
use compiler::lexis::lexer::Lexer;
use compiler::lexis::token::Token;
use compiler::semantics::type_inferrer::TypeInferrer;
use compiler::syntax::ast::Ast;
use compiler::syntax::parser::Parser;

pub mod compiler;
pub mod constants;
pub mod util;

pub type CompileResult<T> = Result<T, CompileError>;

/// # Errors
/// Unknown characters and unterminated strings or comments.
pub fn tokenize(code: &str) -> CompileResult<Vec<Token>> {
    Lexer::new(code).tokenize()
}

/// # Errors
/// Lexical and syntax errors.
pub fn syntax_analyze(context: &mut Context, code: &str) -> CompileResult<Ast> {
    let tokens = tokenize(code)?;
    Parser::new(context, tokens).parse_program()
}

/// Links parents and fills every type slot in place.
///
/// # Errors
/// Undefined names and type mismatches.
pub fn type_infer(ast: &mut Ast) -> CompileResult<()> {
    TypeInferrer::new().infer(ast)
}

/// # Errors
/// A missing `main` function, or a construct the back end cannot lower.
pub fn asm_generate(ast: &Ast) -> CompileResult<String> {
    Generator::new(Arm64::new()).generate(ast)
}

/// Runs the front end and returns the typed tree.
///
/// # Errors
/// The first lexical, syntax or type error.
pub fn analyze(code: &str) -> CompileResult<Ast> {
    let mut context = Context::new();
    let mut ast = syntax_analyze(&mut context, code)?;
    type_infer(&mut ast)?;
    Ok(ast)
}

/// # Errors
/// The first error any stage reports.
pub fn compile(code: &str) -> CompileResult<String> {
    let ast = analyze(code)?;
    asm_generate(&ast)
}
