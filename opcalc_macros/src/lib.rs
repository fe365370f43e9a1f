use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, ItemFn, LitStr, PatType, ReturnType, Type};

fn formatted_arg_error_msg(arg_pos: usize, fn_name: &str) -> String {
    format!("Expected argument {} of {} to be f64", arg_pos, fn_name)
}

fn is_path_ending_in(ty: &Type, ident: &str) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == ident),
        _ => false,
    }
}

/// Turns a plain `fn(f64, ...) -> f64` (or `-> Result<f64, EvalError>`)
/// into a constructor returning the matching `Operation::function`, with
/// the arity taken from the signature.
///
/// The operation is named after the function unless overridden with
/// `#[opcalc_fn(name = "getPi")]`. `Operation` (and `EvalError` for
/// fallible functions) must be in scope at the call site.
#[proc_macro_attribute]
pub fn opcalc_fn(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut name: Option<LitStr> = None;
    let attr_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported opcalc_fn property"))
        }
    });
    parse_macro_input!(attr with attr_parser);

    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let fn_name = &input.sig.ident;
    let fn_args = &input.sig.inputs;
    let fn_body = &input.block;
    let fn_output = &input.sig.output;

    let operation_name =
        name.unwrap_or_else(|| LitStr::new(&fn_name.to_string(), fn_name.span()));

    for (i, arg) in fn_args.iter().enumerate() {
        let valid = match arg {
            FnArg::Typed(PatType { pat, ty, .. }) => {
                matches!(**pat, syn::Pat::Ident(_)) && is_path_ending_in(ty, "f64")
            }
            FnArg::Receiver(_) => false,
        };
        if !valid {
            let err_msg = formatted_arg_error_msg(i, &fn_name.to_string());
            return syn::Error::new_spanned(arg, err_msg)
                .to_compile_error()
                .into();
        }
    }

    let args_len = fn_args.len();
    let args = if args_len == 0 {
        format_ident!("_args")
    } else {
        format_ident!("args")
    };
    let call_args = (0..args_len).map(|i| quote! { #args[#i] });
    let call = quote! { __opcalc_impl(#(#call_args),*) };

    let fallible = match fn_output {
        ReturnType::Type(_, ty) => is_path_ending_in(ty, "Result"),
        ReturnType::Default => false,
    };
    let result = if fallible {
        call
    } else {
        quote! { Ok(#call) }
    };

    let expanded = quote! {
        #(#attrs)*
        #vis fn #fn_name() -> Operation {
            fn __opcalc_impl(#fn_args) #fn_output #fn_body

            Operation::function(#operation_name, #args_len, |#args: &[f64]| #result)
        }
    };

    TokenStream::from(expanded)
}
