//! The Code Emitter: renders a [`crate::translator::NormalizedGrammar`] into a
//! self-contained C header and source file via the askama templates under
//! `templates/`.
//!
//! The templates are the authority on emitted-code shape; this module only
//! owns the options that steer them and the thin `Template::render` plumbing.

use askama::Template;

use crate::translator::NormalizedGrammar;

/// Options controlling how a grammar is rendered to C, independent of the
/// grammar itself. These correspond to `chameleonc`'s `--prefix`,
/// `--thread-safe`, `--visible`, `--seed` and `--no-parse` flags (spec §6).
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Prepended to every emitted symbol name (`<prefix>_generate`, ...).
    pub prefix: String,
    /// Bake a `#define CHAMELEON_THREAD_SAFE` into the emitted source so the
    /// PRNG state is thread-local without the downstream C build needing to
    /// pass `-DCHAMELEON_THREAD_SAFE` itself. The `#ifdef` guard around the
    /// `THREAD_LOCAL` macro is always emitted regardless, so a downstream
    /// build can still flip this at C-compile time even when the flag here
    /// is left off.
    pub thread_safe: bool,
    /// Bake a `#define CHAMELEON_VISIBLE` into the emitted source, causing
    /// the ABI functions to be exported with default visibility instead of
    /// hidden.
    pub visible: bool,
    /// Default value baked into `#ifndef CHAMELEON_SEED` — overridable by the
    /// downstream C build, and always overridable at runtime via `_seed`.
    pub seed: u64,
    /// Emit the `_parse` entry point and its supporting functions.
    pub emit_parse: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            prefix: "chameleon".to_owned(),
            thread_safe: false,
            visible: false,
            seed: 0x9E3779B97F4A7C15,
            emit_parse: true,
        }
    }
}

/// The two files a [`CodeEmitter`] produces for one grammar.
#[derive(Debug, Clone)]
pub struct EmittedModule {
    /// Contents of `<prefix>.h`.
    pub header: String,
    /// Contents of `<prefix>.c`.
    pub source: String,
}

#[derive(Template)]
#[template(path = "header.askama.h", escape = "none")]
struct HeaderTemplate<'a> {
    prefix: &'a str,
    emit_parse: bool,
}

#[derive(Template)]
#[template(path = "source.askama.c", escape = "none")]
struct SourceTemplate<'a> {
    prefix: &'a str,
    thread_safe: bool,
    visible: bool,
    seed: u64,
    emit_parse: bool,
    grammar: &'a NormalizedGrammar,
    triangular_table: Vec<u64>,
}

/// Renders a normalized grammar to a header/source pair of C strings.
pub struct CodeEmitter;

impl CodeEmitter {
    /// Render `grammar` under `options`. The only way this can fail is a
    /// template-rendering bug (a malformed template or a `{{ }}` expression
    /// that doesn't type-check against the data given to it); a grammar that
    /// reached this point has already passed [`crate::normalize::normalize`].
    pub fn emit(grammar: &NormalizedGrammar, options: &EmitOptions) -> Result<EmittedModule, askama::Error> {
        let header = HeaderTemplate {
            prefix: &options.prefix,
            emit_parse: options.emit_parse,
        }
        .render()?;

        let source = SourceTemplate {
            prefix: &options.prefix,
            thread_safe: options.thread_safe,
            visible: options.visible,
            seed: options.seed,
            emit_parse: options.emit_parse,
            grammar,
            triangular_table: grammar.triangular_table(),
        }
        .render()?;

        Ok(EmittedModule { header, source })
    }
}
