use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_line;

#[proc_macro_derive(FromLine, attributes(field))]
pub fn derive_from_line(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_line::expand_from_line(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
