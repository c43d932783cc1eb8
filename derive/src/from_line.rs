use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Error, Field, Fields, GenericArgument, Ident, LitInt, LitStr,
    PathArguments, Result, Token, Type,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

pub(crate) fn expand_from_line(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FromLine` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FromLine` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let specs = fields.iter().map(|field| {
        let FieldMetadata {
            identifier,
            semantic,
            nullable,
            start,
            length,
            format,
            ..
        } = field;

        let format = format.as_ref().map(|f| quote! { .with_format(#f) });

        quote! {
            ::fixwidth::FieldSpec::new(
                #identifier,
                ::fixwidth::DeclaredType::Known {
                    semantic: ::fixwidth::SemanticType::#semantic,
                    nullable: #nullable,
                },
                #start,
                #length,
            )
            #format
        }
    });

    let cases = fields.iter().map(|field| {
        let FieldMetadata {
            name,
            ty,
            identifier,
            ..
        } = field;

        quote! {
            #identifier => {
                if let Some(value) = <#ty as ::fixwidth::FromValue>::from_value(value) {
                    self.#name = value;
                }
            }
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::fixwidth::FromLine for #name {
            fn fields() -> ::std::vec::Vec<::fixwidth::FieldSpec> {
                ::std::vec![#(#specs),*]
            }

            fn set_field(&mut self, field: &str, value: ::fixwidth::Value) {
                match field {
                    #(#cases)*
                    _ => {}
                };
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    ty: Type,
    identifier: String,
    semantic: Ident,
    nullable: bool,
    start: usize,
    length: usize,
    format: Option<LitStr>,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let mut attrs = field.attrs.iter().filter(|a| a.path().is_ident("field"));

        let Some(attr) = attrs.next() else {
            return Ok(None);
        };

        if let Some(repeated) = attrs.next() {
            Err(Error::new_spanned(
                repeated,
                "Field positions must be declared once.",
            ))?
        }

        let FieldAttribute {
            start,
            length,
            format,
        } = attr.meta.require_list()?.parse_args()?;

        let (semantic, nullable) = semantic_type(&field.ty)?;

        Ok(Some(Self {
            identifier: name.unraw().to_string(),
            name,
            ty: field.ty.clone(),
            semantic,
            nullable,
            start,
            length,
            format,
        }))
    }
}

/// Map a field's Rust type to a semantic type, unwrapping `Option<T>`.
fn semantic_type(ty: &Type) -> Result<(Ident, bool)> {
    let Type::Path(path) = ty else {
        Err(Error::new_spanned(ty, "Field must have a type annotation."))?
    };

    let Some(segment) = path.path.segments.last() else {
        Err(Error::new_spanned(
            &path.path.segments,
            "Field must have a type annotation.",
        ))?
    };

    if segment.ident == "Option" {
        let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
            Err(Error::new_spanned(
                &segment.arguments,
                "Field of type `Option<T>` must have a generic parameter.",
            ))?
        };

        let Some(GenericArgument::Type(inner_type)) = arguments.args.first() else {
            Err(Error::new_spanned(
                &arguments.args,
                "Generic argument of a field of type `Option<T>` must be a type.",
            ))?
        };

        let (semantic, _) = semantic_type(inner_type)?;
        return Ok((semantic, true));
    }

    let semantic = match segment.ident.to_string().as_str() {
        "String" => "String",
        "char" => "Char",
        "i32" => "Int32",
        "i64" => "Int64",
        "Decimal" => "Decimal",
        "f32" => "Float",
        "f64" => "Double",
        "bool" => "Boolean",
        "NaiveDateTime" => "DateTime",
        _ => Err(Error::new_spanned(
            &segment.ident,
            "Field type must be one of `String`, `char`, `i32`, `i64`, `Decimal`, `f32`, `f64`, `bool` or `NaiveDateTime`, optionally wrapped in `Option<T>`.",
        ))?,
    };

    Ok((format_ident!("{}", semantic), false))
}

#[derive(Debug)]
struct FieldAttribute {
    start: usize,
    length: usize,
    format: Option<LitStr>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let start_lit = input.parse::<LitInt>()?;
        let start = start_lit.base10_parse::<usize>()?;

        if start == 0 {
            Err(Error::new_spanned(
                start_lit,
                "Field start must be 1 or greater.",
            ))?
        }

        input.parse::<Token![,]>()?;
        let length = input.parse::<LitInt>()?.base10_parse::<usize>()?;

        let format = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<LitStr>()?)
        } else {
            None
        };

        Ok(Self {
            start,
            length,
            format,
        })
    }
}
