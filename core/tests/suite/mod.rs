mod debounce;
mod lifecycle;
