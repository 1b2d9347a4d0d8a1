use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

const USAGE: &str = "rxchan_macro::test only accepts: #[rxchan_macro::test], \
                     #[rxchan_macro::test(local)], #[rxchan_macro::test(shared)] or \
                     #[rxchan_macro::test(paused)], or string equivalents";

/// Runs a test on the tokio runtime flavor its streams need.
///
/// - no argument: `#[test]` for sync fns, a current-thread runtime for async fns
/// - `local`: current-thread runtime
/// - `shared`: multi-thread runtime, for pooled operators and blocking
///   producers
/// - `paused`: current-thread runtime with virtual time, for `debounce`,
///   `interval` and `repeat`
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);

  let is_async = input.sig.asyncness.is_some();

  let raw_args = proc_macro2::TokenStream::from(attr);
  let tokio_args = if raw_args.is_empty() {
    proc_macro2::TokenStream::new()
  } else {
    if !is_async {
      return TokenStream::from(
        syn::Error::new(
          raw_args.span(),
          "rxchan_macro::test flavor args are only supported for async tests. Use \
           #[rxchan_macro::test] for sync tests, or make the function async.",
        )
        .to_compile_error(),
      );
    }

    let (flavor, span) = if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
      (ident.to_string(), ident.span())
    } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
      (lit.value(), lit.span())
    } else {
      return TokenStream::from(syn::Error::new(raw_args.span(), USAGE).to_compile_error());
    };

    match flavor.as_str() {
      "local" => quote!(flavor = "current_thread"),
      "shared" => quote!(flavor = "multi_thread", worker_threads = 4),
      "paused" => quote!(flavor = "current_thread", start_paused = true),
      _ => return TokenStream::from(syn::Error::new(span, USAGE).to_compile_error()),
    }
  };

  let native_attr = match (is_async, tokio_args.is_empty()) {
    (false, _) => quote!(test),
    (true, true) => quote!(tokio::test),
    (true, false) => quote!(tokio::test(#tokio_args)),
  };

  let expanded = quote! {
      #[#native_attr]
      #input
  };

  TokenStream::from(expanded)
}
