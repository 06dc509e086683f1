mod decorate;
mod helpers;
mod pipeline;
