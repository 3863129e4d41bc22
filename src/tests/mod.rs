mod basic;
mod canonical;
mod nfr;
